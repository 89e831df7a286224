//! Command-line front end.
//!
//! `move` replays a drag gesture against the stored board: pick up the
//! todo, hover over each target in turn, drop on the last one.

use std::fmt::Write as _;

use clap::{Args, Parser, Subcommand};

use crate::board::BoardModel;
use crate::domain::{BoardError, ColumnId, NewTodo, TodoPatch, TodoStatus};
use crate::services::{BoardSession, DropOutcome};
use crate::store::TodoStore;

#[derive(Debug, Parser)]
#[command(name = "todo-board", version, about = "Kanban todo board")]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the board column by column
    List,
    /// Append a todo to the end of a column
    Add {
        /// todo, in-progress, review or done
        column: ColumnId,
        title: String,
        #[command(flatten)]
        fields: TodoFields,
    },
    /// Edit a todo's payload
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TodoFields,
    },
    /// Delete a todo
    Delete { id: String },
    /// Drag a todo over one or more targets (columns or todo ids) and drop it on the last
    Move {
        id: String,
        #[arg(required = true)]
        targets: Vec<String>,
    },
}

#[derive(Debug, Default, Args)]
pub struct TodoFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// green, yellow or red
    #[arg(long)]
    pub status: Option<TodoStatus>,
    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl TodoFields {
    fn into_patch(self, title: Option<String>) -> TodoPatch {
        TodoPatch {
            title,
            description: self.description,
            additional_info: self.notes,
            status: self.status,
            due_date: self.due,
            tags: (!self.tags.is_empty()).then_some(self.tags),
            ..Default::default()
        }
    }
}

/// Run one command against a loaded session and return what to print.
pub async fn run<S: TodoStore>(
    session: &mut BoardSession<S>,
    command: Commands,
) -> Result<String, BoardError> {
    match command {
        Commands::List => Ok(render_board(session.board())),
        Commands::Add {
            column,
            title,
            fields,
        } => {
            let input = NewTodo {
                title,
                description: fields.description,
                additional_info: fields.notes,
                status: fields.status.unwrap_or_default(),
                column: Some(column),
                position: session.board().next_position(column),
                due_date: fields.due,
                tags: fields.tags,
            };
            let todo = session.create_todo(input).await?;
            Ok(format!("Created {} in {}\n", todo.id, todo.column))
        }
        Commands::Edit { id, title, fields } => {
            let patch = fields.into_patch(title);
            if patch.is_empty() {
                return Err(BoardError::Validation("nothing to change".into()));
            }
            let todo = session.update_todo(&id, patch).await?;
            Ok(format!("Updated {}\n", todo.id))
        }
        Commands::Delete { id } => {
            session.delete_todo(&id).await?;
            Ok(format!("Deleted {}\n", id))
        }
        Commands::Move { id, targets } => {
            if !session.pick_up(&id) {
                return Err(BoardError::NotFound(format!("Todo not found: {}", id)));
            }
            for target in &targets {
                session.hover_over(Some(target));
            }

            let outcome = session.drop(targets.last().map(String::as_str)).await?;
            let mut out = match outcome {
                DropOutcome::Persisted { rows, resynced } => {
                    let mut line = format!("Moved {} ({} rows written)", id, rows);
                    if !resynced {
                        line.push_str(", board not reloaded");
                    }
                    line
                }
                DropOutcome::Unchanged => format!("{} did not move", id),
                DropOutcome::Cancelled => format!("Move of {} cancelled", id),
                DropOutcome::Ignored => format!("Nothing to move for {}", id),
            };
            out.push_str("\n\n");
            out.push_str(&render_board(session.board()));
            Ok(out)
        }
    }
}

pub fn render_board(board: &BoardModel) -> String {
    let mut out = String::new();

    for column in ColumnId::all() {
        let todos = board.column_view(*column);
        let _ = writeln!(out, "{} ({})", column.title(), todos.len());

        for todo in todos {
            let _ = write!(
                out,
                "  {:>3}. {} [{}] {}",
                todo.position, todo.title, todo.status, todo.id
            );
            if let Some(due) = &todo.due_date {
                let _ = write!(out, " due {}", due);
            }
            if !todo.tags.is_empty() {
                let _ = write!(out, " #{}", todo.tags.join(" #"));
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_move_with_several_targets() {
        let cli = Cli::parse_from(["todo-board", "move", "abc", "review", "def"]);
        match cli.command {
            Commands::Move { id, targets } => {
                assert_eq!(id, "abc");
                assert_eq!(targets, vec!["review".to_string(), "def".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn add_rejects_unknown_column() {
        assert!(Cli::try_parse_from(["todo-board", "add", "backlog", "Title"]).is_err());
    }

    #[test]
    fn edit_fields_become_a_patch() {
        let cli = Cli::parse_from([
            "todo-board",
            "edit",
            "abc",
            "--status",
            "red",
            "--tag",
            "urgent",
        ]);
        let Commands::Edit { title, fields, .. } = cli.command else {
            panic!("expected edit");
        };
        let patch = fields.into_patch(title);
        assert_eq!(patch.status, Some(TodoStatus::Red));
        assert_eq!(patch.tags, Some(vec!["urgent".to_string()]));
        assert!(patch.title.is_none());
    }

    #[test]
    fn renders_columns_in_board_order() {
        let rendered = render_board(&BoardModel::new());
        let headers: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            headers,
            vec!["To Do (0)", "In Progress (0)", "Review (0)", "Done (0)"]
        );
    }
}

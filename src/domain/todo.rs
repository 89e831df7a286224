use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{BoardError, ColumnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Green,
    Yellow,
    Red,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Green => "green",
            TodoStatus::Yellow => "yellow",
            TodoStatus::Red => "red",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(TodoStatus::Green),
            "yellow" => Ok(TodoStatus::Yellow),
            "red" => Ok(TodoStatus::Red),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// A task card. Only `id`, `column` and `position` matter to reconciliation;
/// everything else is payload carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub status: TodoStatus,
    #[serde(rename = "column_id")]
    pub column: ColumnId,
    pub position: i64,
    pub due_date: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Row shape of the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub status: String,
    pub column_id: String,
    pub position: i64,
    pub due_date: Option<String>,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<TodoRow> for Todo {
    type Error = BoardError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let column = row.column_id.parse::<ColumnId>().map_err(|e| {
            BoardError::Storage(format!("Invalid column in DB for todo {}: {}", row.id, e))
        })?;
        let status = row.status.parse::<TodoStatus>().map_err(|e| {
            BoardError::Storage(format!("Invalid status in DB for todo {}: {}", row.id, e))
        })?;
        let tags: Vec<String> = serde_json::from_str(&row.tags)?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            additional_info: row.additional_info,
            status,
            column,
            position: row.position,
            due_date: row.due_date,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub status: TodoStatus,
    #[serde(rename = "column_id")]
    pub column: Option<ColumnId>,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTodo {
    pub fn new(column: ColumnId, title: impl Into<String>, position: i64) -> Self {
        Self {
            title: title.into(),
            column: Some(column),
            position,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<ColumnId, BoardError> {
        validate_title(&self.title)?;
        validate_position(self.position)?;
        if let Some(due) = &self.due_date {
            validate_due_date(due)?;
        }
        validate_tags(&self.tags)?;
        self.column
            .ok_or_else(|| BoardError::Validation("column is required".into()))
    }
}

/// Partial update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub status: Option<TodoStatus>,
    #[serde(default, rename = "column_id")]
    pub column: Option<ColumnId>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.additional_info.is_none()
            && self.status.is_none()
            && self.column.is_none()
            && self.position.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(position) = self.position {
            validate_position(position)?;
        }
        if let Some(due) = &self.due_date {
            validate_due_date(due)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }

    /// Merge onto the stored item the way an UPDATE would.
    pub fn apply_to(self, mut todo: Todo) -> Todo {
        if let Some(title) = self.title {
            todo.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            todo.description = Some(description);
        }
        if let Some(info) = self.additional_info {
            todo.additional_info = Some(info);
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
        if let Some(column) = self.column {
            todo.column = column;
        }
        if let Some(position) = self.position {
            todo.position = position;
        }
        if let Some(due) = self.due_date {
            todo.due_date = Some(due);
        }
        if let Some(tags) = self.tags {
            todo.tags = dedup_tags(tags);
        }
        todo
    }
}

/// One row of a batch position write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: String,
    #[serde(rename = "column_id")]
    pub column: ColumnId,
    pub position: i64,
}

fn validate_title(title: &str) -> Result<(), BoardError> {
    if title.trim().is_empty() {
        return Err(BoardError::Validation("title must not be empty".into()));
    }
    Ok(())
}

fn validate_position(position: i64) -> Result<(), BoardError> {
    if position < 0 {
        return Err(BoardError::Validation(format!(
            "position must be non-negative, got {}",
            position
        )));
    }
    Ok(())
}

fn validate_due_date(due: &str) -> Result<(), BoardError> {
    NaiveDate::parse_from_str(due, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|e| BoardError::Validation(format!("invalid due date '{}': {}", due, e)))
}

fn validate_tags(tags: &[String]) -> Result<(), BoardError> {
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(BoardError::Validation("tags must not be empty".into()));
    }
    Ok(())
}

/// Trim tags and keep the first occurrence of each.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !kept.iter().any(|k| k == tag) {
            kept.push(tag.to_string());
        }
    }
    kept
}

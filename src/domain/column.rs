use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow stage a todo sits in. The set is closed; columns are never persisted on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Todo,
    InProgress,
    Review,
    Done,
}

impl ColumnId {
    pub const COUNT: usize = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Todo => "todo",
            ColumnId::InProgress => "in-progress",
            ColumnId::Review => "review",
            ColumnId::Done => "done",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ColumnId::Todo => "To Do",
            ColumnId::InProgress => "In Progress",
            ColumnId::Review => "Review",
            ColumnId::Done => "Done",
        }
    }

    /// Display order of the board, left to right.
    pub fn all() -> &'static [ColumnId] {
        &[
            ColumnId::Todo,
            ColumnId::InProgress,
            ColumnId::Review,
            ColumnId::Done,
        ]
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ColumnId::Todo => 0,
            ColumnId::InProgress => 1,
            ColumnId::Review => 2,
            ColumnId::Done => 3,
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(ColumnId::Todo),
            "in-progress" => Ok(ColumnId::InProgress),
            "review" => Ok(ColumnId::Review),
            "done" => Ok(ColumnId::Done),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_display_name() {
        for column in ColumnId::all() {
            assert_eq!(column.as_str().parse::<ColumnId>(), Ok(*column));
        }
    }

    #[test]
    fn rejects_unknown_and_snake_case_names() {
        assert!("in_progress".parse::<ColumnId>().is_err());
        assert!("Todo".parse::<ColumnId>().is_err());
        assert!("".parse::<ColumnId>().is_err());
    }

    #[test]
    fn index_follows_display_order() {
        let indexes: Vec<usize> = ColumnId::all().iter().map(ColumnId::index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert_eq!(ColumnId::all().len(), ColumnId::COUNT);
    }

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&ColumnId::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }
}

//! Persistence contract the board talks to.
//!
//! Every call is scoped to one authenticated user. Batch position writes
//! are applied row by row with no transaction around them.

pub mod sqlite;

use async_trait::async_trait;

use crate::domain::{BoardError, NewTodo, PositionUpdate, Todo, TodoPatch};

pub use sqlite::SqliteTodoStore;

/// The caller on whose behalf storage is accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScope {
    pub user_id: String,
}

impl UserScope {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All of the caller's todos, ordered by position.
    async fn fetch_all(&self, scope: &UserScope) -> Result<Vec<Todo>, BoardError>;

    async fn create(&self, scope: &UserScope, input: NewTodo) -> Result<Todo, BoardError>;

    async fn update(
        &self,
        scope: &UserScope,
        id: &str,
        patch: TodoPatch,
    ) -> Result<Todo, BoardError>;

    async fn delete(&self, scope: &UserScope, id: &str) -> Result<(), BoardError>;

    /// Apply each row independently. Rows written before a failing row stay written.
    async fn batch_update_positions(
        &self,
        scope: &UserScope,
        updates: &[PositionUpdate],
    ) -> Result<(), BoardError>;
}

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{TodoStore, UserScope};
use crate::domain::{dedup_tags, BoardError, NewTodo, PositionUpdate, Todo, TodoPatch, TodoRow};

#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn authorize(&self, scope: &UserScope) -> Result<(), BoardError> {
        if scope.user_id.is_empty() {
            return Err(BoardError::Unauthenticated);
        }

        let user: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(&scope.user_id)
            .fetch_optional(&self.pool)
            .await?;

        user.map(|_| ()).ok_or(BoardError::Unauthenticated)
    }

    async fn get_owned(&self, scope: &UserScope, id: &str) -> Result<Todo, BoardError> {
        let row: TodoRow = sqlx::query_as("SELECT * FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&scope.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("Todo not found: {}", id)))?;

        Todo::try_from(row)
    }

    async fn update_position(
        &self,
        scope: &UserScope,
        row: &PositionUpdate,
        now: &str,
    ) -> Result<(), String> {
        let result = sqlx::query(
            "UPDATE todos SET column_id = ?, position = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(row.column.as_str())
        .bind(row.position)
        .bind(now)
        .bind(&row.id)
        .bind(&scope.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.to_string())?;

        if result.rows_affected() == 0 {
            return Err(format!("Todo not found: {}", row.id));
        }

        Ok(())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn fetch_all(&self, scope: &UserScope) -> Result<Vec<Todo>, BoardError> {
        self.authorize(scope).await?;

        let rows: Vec<TodoRow> = sqlx::query_as(
            "SELECT * FROM todos WHERE user_id = ? ORDER BY position ASC, created_at ASC",
        )
        .bind(&scope.user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn create(&self, scope: &UserScope, input: NewTodo) -> Result<Todo, BoardError> {
        self.authorize(scope).await?;
        let column = input.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let tags = serde_json::to_string(&dedup_tags(input.tags))?;

        sqlx::query(
            "INSERT INTO todos (id, user_id, title, description, additional_info, status, column_id, position, due_date, tags, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&scope.user_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.additional_info)
        .bind(input.status.as_str())
        .bind(column.as_str())
        .bind(input.position)
        .bind(&input.due_date)
        .bind(&tags)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(todo_id = id.as_str(), column = %column, position = input.position, "Todo created");
        self.get_owned(scope, &id).await
    }

    async fn update(
        &self,
        scope: &UserScope,
        id: &str,
        patch: TodoPatch,
    ) -> Result<Todo, BoardError> {
        self.authorize(scope).await?;
        patch.validate()?;

        let existing = self.get_owned(scope, id).await?;
        let todo = patch.apply_to(existing);
        let now = Utc::now().to_rfc3339();
        let tags = serde_json::to_string(&todo.tags)?;

        sqlx::query(
            "UPDATE todos SET title = ?, description = ?, additional_info = ?, status = ?, column_id = ?, position = ?, due_date = ?, tags = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.additional_info)
        .bind(todo.status.as_str())
        .bind(todo.column.as_str())
        .bind(todo.position)
        .bind(&todo.due_date)
        .bind(&tags)
        .bind(&now)
        .bind(id)
        .bind(&scope.user_id)
        .execute(&self.pool)
        .await?;

        self.get_owned(scope, id).await
    }

    async fn delete(&self, scope: &UserScope, id: &str) -> Result<(), BoardError> {
        self.authorize(scope).await?;

        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&scope.user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BoardError::NotFound(format!("Todo not found: {}", id)));
        }

        Ok(())
    }

    async fn batch_update_positions(
        &self,
        scope: &UserScope,
        updates: &[PositionUpdate],
    ) -> Result<(), BoardError> {
        self.authorize(scope).await?;

        let now = Utc::now().to_rfc3339();
        for (applied, row) in updates.iter().enumerate() {
            if let Err(reason) = self.update_position(scope, row, &now).await {
                tracing::error!(
                    todo_id = row.id.as_str(),
                    applied,
                    total = updates.len(),
                    "Batch position update failed: {}",
                    reason
                );

                if applied == 0 {
                    return Err(BoardError::Storage(reason));
                }
                return Err(BoardError::PartialBatchFailure {
                    applied,
                    total: updates.len(),
                    failed_id: row.id.clone(),
                    reason,
                });
            }
        }

        tracing::debug!(rows = updates.len(), "Batch position update applied");
        Ok(())
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use todo_board::board::BoardModel;
use todo_board::domain::{BoardError, ColumnId, NewTodo, PositionUpdate, Todo, TodoPatch};
use todo_board::infrastructure::{db, seed};
use todo_board::services::{BoardSession, SessionOptions};
use todo_board::store::{SqliteTodoStore, TodoStore, UserScope};

pub async fn setup_test_db() -> (SqlitePool, UserScope) {
    // one connection: every connection to sqlite::memory: is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    db::migrate(&pool).await.expect("Failed to run migrations");

    let user_id = seed::seed_user(&pool, "tester")
        .await
        .expect("Failed to seed test user");

    (pool, UserScope::new(user_id))
}

/// Insert a todo with a fixed id. `seq` orders rows that share a position.
pub async fn insert_todo(
    pool: &SqlitePool,
    scope: &UserScope,
    id: &str,
    column: ColumnId,
    position: i64,
    seq: u32,
) {
    let created_at = format!("2026-01-01T00:00:{:02}Z", seq);
    sqlx::query(
        "INSERT INTO todos (id, user_id, title, status, column_id, position, tags, created_at, updated_at) VALUES (?, ?, ?, 'green', ?, ?, '[]', ?, ?)",
    )
    .bind(id)
    .bind(&scope.user_id)
    .bind(format!("Todo {}", id))
    .bind(column.as_str())
    .bind(position)
    .bind(&created_at)
    .bind(&created_at)
    .execute(pool)
    .await
    .expect("Failed to insert todo");
}

/// Column `todo` holds a, b, c and column `review` holds y, z.
pub async fn seed_board(pool: &SqlitePool, scope: &UserScope) {
    let rows = [
        ("a", ColumnId::Todo, 0),
        ("b", ColumnId::Todo, 1),
        ("c", ColumnId::Todo, 2),
        ("y", ColumnId::Review, 0),
        ("z", ColumnId::Review, 1),
    ];
    for (seq, (id, column, position)) in rows.into_iter().enumerate() {
        insert_todo(pool, scope, id, column, position, seq as u32).await;
    }
}

pub fn ids(board: &BoardModel, column: ColumnId) -> Vec<String> {
    board
        .column_view(column)
        .iter()
        .map(|t| t.id.clone())
        .collect()
}

pub fn positions(board: &BoardModel, column: ColumnId) -> Vec<i64> {
    board.column_view(column).iter().map(|t| t.position).collect()
}

/// Store wrapper that records batch writes and can be told to fail or hang.
pub struct FlakyStore {
    inner: SqliteTodoStore,
    fail_batch_after: Mutex<Option<usize>>,
    hang_batch: AtomicBool,
    fail_fetch: AtomicBool,
    batch_calls: AtomicUsize,
    batches: Mutex<Vec<Vec<PositionUpdate>>>,
}

impl FlakyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: SqliteTodoStore::new(pool),
            fail_batch_after: Mutex::new(None),
            hang_batch: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            batch_calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Apply the first `rows` rows of the next batches, then fail.
    pub fn fail_batch_after(&self, rows: usize) {
        *self.fail_batch_after.lock().unwrap() = Some(rows);
    }

    pub fn hang_batch(&self) {
        self.hang_batch.store(true, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn last_batch(&self) -> Option<Vec<PositionUpdate>> {
        self.batches.lock().unwrap().last().cloned()
    }

    pub fn inner(&self) -> &SqliteTodoStore {
        &self.inner
    }
}

#[async_trait]
impl TodoStore for FlakyStore {
    async fn fetch_all(&self, scope: &UserScope) -> Result<Vec<Todo>, BoardError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(BoardError::Storage("fetch failed".into()));
        }
        self.inner.fetch_all(scope).await
    }

    async fn create(&self, scope: &UserScope, input: NewTodo) -> Result<Todo, BoardError> {
        self.inner.create(scope, input).await
    }

    async fn update(
        &self,
        scope: &UserScope,
        id: &str,
        patch: TodoPatch,
    ) -> Result<Todo, BoardError> {
        self.inner.update(scope, id, patch).await
    }

    async fn delete(&self, scope: &UserScope, id: &str) -> Result<(), BoardError> {
        self.inner.delete(scope, id).await
    }

    async fn batch_update_positions(
        &self,
        scope: &UserScope,
        updates: &[PositionUpdate],
    ) -> Result<(), BoardError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(updates.to_vec());

        if self.hang_batch.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }

        let fail_after = *self.fail_batch_after.lock().unwrap();
        match fail_after {
            None => self.inner.batch_update_positions(scope, updates).await,
            Some(rows) => {
                let applied = rows.min(updates.len());
                self.inner
                    .batch_update_positions(scope, &updates[..applied])
                    .await?;
                if applied == 0 {
                    return Err(BoardError::Storage("injected failure".into()));
                }
                Err(BoardError::PartialBatchFailure {
                    applied,
                    total: updates.len(),
                    failed_id: updates
                        .get(applied)
                        .map(|u| u.id.clone())
                        .unwrap_or_default(),
                    reason: "injected failure".into(),
                })
            }
        }
    }
}

pub async fn setup_session(options: SessionOptions) -> BoardSession<FlakyStore> {
    let (pool, scope) = setup_test_db().await;
    seed_board(&pool, &scope).await;

    let mut session = BoardSession::new(FlakyStore::new(pool), scope, options);
    session.load().await.expect("Failed to load board");
    session
}

/// The board as storage has it right now.
pub async fn fresh_board(session: &BoardSession<FlakyStore>) -> BoardModel {
    let items = session
        .store()
        .inner()
        .fetch_all(session.scope())
        .await
        .expect("Failed to fetch todos");
    BoardModel::from_items(items)
}

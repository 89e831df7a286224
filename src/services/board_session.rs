use std::future::Future;
use std::time::Duration;

use crate::board::{BoardModel, DragReconciler, DropPlan, DropTarget};
use crate::domain::{BoardError, ColumnId, NewTodo, Todo, TodoPatch};
use crate::store::{TodoStore, UserScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Upper bound for every store call; expiry counts as a storage failure.
    pub persist_timeout: Duration,
    /// Reload from storage after a gesture ends without a target.
    pub reload_on_cancel: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            persist_timeout: Duration::from_secs(10),
            reload_on_cancel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A drag is in flight; the items are applied once it ends.
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Ignored,
    Cancelled,
    Unchanged,
    Persisted {
        rows: usize,
        /// False when the post-write reload failed and the board still shows
        /// the locally normalized state.
        resynced: bool,
    },
}

/// One user's board: the in-memory model, the drag state machine and the
/// store they persist to.
pub struct BoardSession<S> {
    store: S,
    scope: UserScope,
    options: SessionOptions,
    board: BoardModel,
    drag: DragReconciler,
    rollback: Option<BoardModel>,
    pending_refresh: Option<Vec<Todo>>,
}

impl<S: TodoStore> BoardSession<S> {
    pub fn new(store: S, scope: UserScope, options: SessionOptions) -> Self {
        Self {
            store,
            scope,
            options,
            board: BoardModel::new(),
            drag: DragReconciler::new(),
            rollback: None,
            pending_refresh: None,
        }
    }

    pub fn board(&self) -> &BoardModel {
        &self.board
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scope(&self) -> &UserScope {
        &self.scope
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Fetch the board from storage. Deferred like any other refresh while dragging.
    pub async fn load(&mut self) -> Result<RefreshOutcome, BoardError> {
        let items = with_timeout(
            self.options.persist_timeout,
            "fetch todos",
            self.store.fetch_all(&self.scope),
        )
        .await?;

        tracing::debug!(todos = items.len(), "Board fetched");
        Ok(self.apply_refresh(items))
    }

    /// Overwrite the board from outside. Queued while a gesture is active so
    /// the optimistic positions are not lost; the newest refresh wins.
    pub fn apply_refresh(&mut self, items: Vec<Todo>) -> RefreshOutcome {
        if self.drag.is_dragging() {
            tracing::debug!(todos = items.len(), "Refresh deferred until the drag ends");
            self.pending_refresh = Some(items);
            return RefreshOutcome::Deferred;
        }

        self.board.replace_all(items);
        RefreshOutcome::Applied
    }

    // ── Gesture ────────────────────────────────────────────────

    pub fn pick_up(&mut self, item_id: &str) -> bool {
        if !self.drag.pick_up(&self.board, item_id) {
            return false;
        }
        self.rollback = Some(self.board.clone());
        true
    }

    pub fn hover_over(&mut self, target: Option<&str>) -> bool {
        let target = DropTarget::resolve(target, &self.board);
        self.drag.hover(&mut self.board, &target)
    }

    /// End the gesture, persist the renumbered rows and resync from storage.
    ///
    /// The reload runs after the write on both the success and the failure
    /// path. A failed write is returned once the board has been resynced.
    pub async fn drop(&mut self, target: Option<&str>) -> Result<DropOutcome, BoardError> {
        let target = DropTarget::resolve(target, &self.board);
        let plan = self.drag.drop(&mut self.board, &target);
        let rollback = self.rollback.take();

        match plan {
            DropPlan::Ignored => Ok(DropOutcome::Ignored),
            DropPlan::Cancelled(snapshot) => {
                if !self.options.reload_on_cancel {
                    // hovers moved the item in memory only; storage still has the pre-drag board
                    if let Some(board) = rollback {
                        self.board = board;
                    }
                    self.apply_pending();
                    return Ok(DropOutcome::Cancelled);
                }

                tracing::debug!(
                    todo_id = snapshot.item_id.as_str(),
                    "Reloading board after cancelled drag"
                );
                if let Err(e) = self.reload().await {
                    tracing::warn!("Reload after cancelled drag failed: {}", e);
                    if let Some(board) = rollback {
                        self.board = board;
                    }
                    self.pending_refresh = None;
                    return Err(e);
                }
                Ok(DropOutcome::Cancelled)
            }
            DropPlan::Unchanged(_) => {
                self.apply_pending();
                Ok(DropOutcome::Unchanged)
            }
            DropPlan::Persist { snapshot, updates } => {
                let rows = updates.len();
                tracing::debug!(rows, "Persisting position updates: {:?}", updates);

                let written = with_timeout(
                    self.options.persist_timeout,
                    "batch position update",
                    self.store.batch_update_positions(&self.scope, &updates),
                )
                .await;
                let reloaded = self.reload().await;

                match (written, reloaded) {
                    (Ok(()), Ok(())) => {
                        tracing::info!(
                            todo_id = snapshot.item_id.as_str(),
                            rows,
                            "Drag persisted"
                        );
                        Ok(DropOutcome::Persisted {
                            rows,
                            resynced: true,
                        })
                    }
                    (Ok(()), Err(e)) => {
                        tracing::warn!(
                            todo_id = snapshot.item_id.as_str(),
                            "Positions saved but reload failed: {}",
                            e
                        );
                        self.pending_refresh = None;
                        Ok(DropOutcome::Persisted {
                            rows,
                            resynced: false,
                        })
                    }
                    (Err(e), Ok(())) => {
                        tracing::error!(
                            todo_id = snapshot.item_id.as_str(),
                            "Failed to update positions: {}",
                            e
                        );
                        Err(e)
                    }
                    (Err(e), Err(reload_err)) => {
                        tracing::error!(
                            todo_id = snapshot.item_id.as_str(),
                            "Failed to update positions: {}; reload failed too: {}",
                            e,
                            reload_err
                        );
                        if let Some(board) = rollback {
                            self.board = board;
                        }
                        self.pending_refresh = None;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Abandon the gesture as if dropped outside every target.
    pub async fn cancel(&mut self) -> Result<DropOutcome, BoardError> {
        self.drop(None).await
    }

    async fn reload(&mut self) -> Result<(), BoardError> {
        let items = with_timeout(
            self.options.persist_timeout,
            "fetch todos",
            self.store.fetch_all(&self.scope),
        )
        .await?;

        self.board.replace_all(items);
        self.pending_refresh = None;
        Ok(())
    }

    fn apply_pending(&mut self) {
        if let Some(items) = self.pending_refresh.take() {
            tracing::debug!(todos = items.len(), "Applying deferred refresh");
            self.board.replace_all(items);
        }
    }

    // ── Single-item operations ─────────────────────────────────

    /// Create a todo at the end of `column`.
    pub async fn add_todo(
        &mut self,
        column: ColumnId,
        title: impl Into<String>,
    ) -> Result<Todo, BoardError> {
        let position = self.board.next_position(column);
        self.create_todo(NewTodo::new(column, title, position)).await
    }

    pub async fn create_todo(&mut self, input: NewTodo) -> Result<Todo, BoardError> {
        self.ensure_idle("create")?;
        let todo = with_timeout(
            self.options.persist_timeout,
            "create todo",
            self.store.create(&self.scope, input),
        )
        .await
        .inspect_err(|e| tracing::warn!("Failed to create todo: {}", e))?;

        self.board.upsert_one(todo.clone());
        Ok(todo)
    }

    pub async fn update_todo(&mut self, id: &str, patch: TodoPatch) -> Result<Todo, BoardError> {
        self.ensure_idle("update")?;
        let todo = with_timeout(
            self.options.persist_timeout,
            "update todo",
            self.store.update(&self.scope, id, patch),
        )
        .await
        .inspect_err(|e| tracing::warn!("Failed to update todo {}: {}", id, e))?;

        self.board.upsert_one(todo.clone());
        Ok(todo)
    }

    pub async fn delete_todo(&mut self, id: &str) -> Result<(), BoardError> {
        self.ensure_idle("delete")?;
        with_timeout(
            self.options.persist_timeout,
            "delete todo",
            self.store.delete(&self.scope, id),
        )
        .await
        .inspect_err(|e| tracing::warn!("Failed to delete todo {}: {}", id, e))?;

        self.board.remove_one(id);
        Ok(())
    }

    /// Single-item writes would reshuffle the columns under an active drag.
    fn ensure_idle(&self, operation: &str) -> Result<(), BoardError> {
        if self.drag.is_dragging() {
            return Err(BoardError::Validation(format!(
                "cannot {} a todo while a drag is in progress",
                operation
            )));
        }
        Ok(())
    }
}

async fn with_timeout<T>(
    limit: Duration,
    operation: &str,
    call: impl Future<Output = Result<T, BoardError>>,
) -> Result<T, BoardError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BoardError::Storage(format!(
            "{} timed out after {}ms",
            operation,
            limit.as_millis()
        ))),
    }
}

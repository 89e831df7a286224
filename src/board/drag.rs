//! Drag gesture state machine.
//!
//! The reconciler never touches storage. It mutates the [`BoardModel`]
//! optimistically while the pointer moves and, on drop, renumbers every
//! column and hands back the rows that need to be written.

use crate::board::BoardModel;
use crate::domain::{ColumnId, PositionUpdate};

/// What the pointer is over. Resolved once from the raw identifier the UI reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(ColumnId),
    Item(String),
    None,
}

impl DropTarget {
    /// Column identifiers take precedence; otherwise the id must name a known item.
    pub fn resolve(raw: Option<&str>, board: &BoardModel) -> Self {
        let Some(raw) = raw else {
            return DropTarget::None;
        };
        if let Ok(column) = raw.parse::<ColumnId>() {
            return DropTarget::Column(column);
        }
        if board.contains(raw) {
            return DropTarget::Item(raw.to_string());
        }
        DropTarget::None
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DropTarget::None)
    }
}

/// Pre-gesture state of the picked item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSnapshot {
    pub item_id: String,
    pub column: ColumnId,
    pub position: i64,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSnapshot),
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    /// No gesture was active.
    Ignored,
    /// Dropped outside any target. The board keeps whatever the last hover produced.
    Cancelled(DragSnapshot),
    /// Back where it started.
    Unchanged(DragSnapshot),
    /// Board renumbered; these rows must be written.
    Persist {
        snapshot: DragSnapshot,
        updates: Vec<PositionUpdate>,
    },
}

#[derive(Debug, Default)]
pub struct DragReconciler {
    state: DragState,
}

impl DragReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active(&self) -> Option<&DragSnapshot> {
        match &self.state {
            DragState::Dragging(snapshot) => Some(snapshot),
            DragState::Idle => None,
        }
    }

    /// Start a gesture. Unknown ids and a pick-up during an active gesture are ignored.
    pub fn pick_up(&mut self, board: &BoardModel, item_id: &str) -> bool {
        if let DragState::Dragging(active) = &self.state {
            tracing::debug!(
                todo_id = item_id,
                active = active.item_id.as_str(),
                "Ignoring pick-up while another drag is active"
            );
            return false;
        }

        let Some((column, index)) = board.locate(item_id) else {
            tracing::debug!(todo_id = item_id, "Ignoring pick-up of unknown todo");
            return false;
        };
        let position = board.column_view(column)[index].position;

        tracing::debug!(todo_id = item_id, column = %column, position, "Drag started");
        self.state = DragState::Dragging(DragSnapshot {
            item_id: item_id.to_string(),
            column,
            position,
            index,
        });
        true
    }

    /// Apply one hover event. Returns whether the board changed.
    pub fn hover(&mut self, board: &mut BoardModel, target: &DropTarget) -> bool {
        let DragState::Dragging(snapshot) = &self.state else {
            return false;
        };
        let Some((current_column, current_index)) = board.locate(&snapshot.item_id) else {
            return false;
        };

        let (target_column, over_index) = match target {
            DropTarget::None => return false,
            DropTarget::Item(id) if *id == snapshot.item_id => return false,
            DropTarget::Item(id) => match board.locate(id) {
                Some((column, index)) => (column, Some(index)),
                None => return false,
            },
            DropTarget::Column(column) => (*column, None),
        };

        if target_column == current_column {
            return match over_index {
                Some(to) if to != current_index => {
                    board.move_within(current_column, current_index, to);
                    true
                }
                _ => false,
            };
        }

        board.transfer(current_column, current_index, target_column, over_index);
        true
    }

    /// End the gesture. The reconciler is idle afterwards whatever the outcome.
    pub fn drop(&mut self, board: &mut BoardModel, target: &DropTarget) -> DropPlan {
        let snapshot = match std::mem::take(&mut self.state) {
            DragState::Idle => return DropPlan::Ignored,
            DragState::Dragging(snapshot) => snapshot,
        };

        if target.is_none() {
            tracing::debug!(todo_id = snapshot.item_id.as_str(), "Drag cancelled");
            return DropPlan::Cancelled(snapshot);
        }

        let Some((column, index)) = board.locate(&snapshot.item_id) else {
            tracing::warn!(
                todo_id = snapshot.item_id.as_str(),
                "Dragged todo vanished from the board before drop"
            );
            return DropPlan::Cancelled(snapshot);
        };

        if column == snapshot.column && index == snapshot.index {
            return DropPlan::Unchanged(snapshot);
        }

        let updates = normalize(board, &snapshot);
        tracing::debug!(
            todo_id = snapshot.item_id.as_str(),
            from = %snapshot.column,
            to = %column,
            index,
            rows = updates.len(),
            "Drag ended with changes"
        );

        DropPlan::Persist { snapshot, updates }
    }

    /// Abandon the gesture without a target.
    pub fn cancel(&mut self, board: &mut BoardModel) -> DropPlan {
        self.drop(board, &DropTarget::None)
    }
}

/// Assign `0..n-1` by list index in every column and return the rows whose
/// stored column or position differs. The dragged item is always included.
fn normalize(board: &mut BoardModel, snapshot: &DragSnapshot) -> Vec<PositionUpdate> {
    let mut updates = Vec::new();

    for column in ColumnId::all() {
        for (index, todo) in board.column_mut(*column).iter_mut().enumerate() {
            let position = index as i64;
            let dragged = todo.id == snapshot.item_id;
            let stored_column = if dragged { snapshot.column } else { todo.column };

            if dragged || todo.position != position || stored_column != *column {
                updates.push(PositionUpdate {
                    id: todo.id.clone(),
                    column: *column,
                    position,
                });
            }

            todo.column = *column;
            todo.position = position;
        }
    }

    updates
}

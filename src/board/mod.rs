pub mod drag;
pub mod model;

pub use drag::{DragReconciler, DragSnapshot, DropPlan, DropTarget};
pub use model::BoardModel;

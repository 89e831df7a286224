pub mod column;
pub mod error;
pub mod todo;

pub use column::ColumnId;
pub use error::BoardError;
pub use todo::{dedup_tags, NewTodo, PositionUpdate, Todo, TodoPatch, TodoRow, TodoStatus};

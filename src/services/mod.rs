pub mod board_session;

pub use board_session::{BoardSession, DropOutcome, RefreshOutcome, SessionOptions};

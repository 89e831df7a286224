#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Some rows of a batch were written before one failed. Nothing is rolled back.
    #[error("batch update stopped at row {failed_id} after {applied} of {total} rows: {reason}")]
    PartialBatchFailure {
        applied: usize,
        total: usize,
        failed_id: String,
        reason: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BoardError {
    /// True for every failure that originates in the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            BoardError::Storage(_)
                | BoardError::PartialBatchFailure { .. }
                | BoardError::Database(_)
                | BoardError::Serialization(_)
        )
    }
}

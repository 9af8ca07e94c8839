//! # Error Handling
//!
//! Structured error types for the task lifecycle core. Storage failures from
//! the synchronous update operations propagate as `Database`; the best-effort
//! reporters in the model log failures instead of returning them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskLedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored result payload carries an unknown format tag or fails to
    /// decode under its declared format. Data-integrity error, not retryable.
    #[error("Result encoding error: {0}")]
    ResultEncoding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Job subsystem error: {0}")]
    Job(String),
}

pub type Result<T> = std::result::Result<T, TaskLedgerError>;

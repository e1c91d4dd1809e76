//! Error types for the ledger module.

use permacert_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur while recording a certificate.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored row could not be read back.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The backend refused the record.
    #[error("record rejected: {0}")]
    Rejected(String),

    /// The blocking worker failed.
    #[error("recorder task failed: {0}")]
    Task(String),
}

impl RecorderError {
    /// The taxonomy kind of this error. Always `RecorderFailed`.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::RecorderFailed
    }
}

/// Result type for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;

//! Error types for the pipeline.

use permacert_core::ErrorKind;
use permacert_session::SessionError;
use permacert_storage::UploadError;
use thiserror::Error;

/// Errors surfaced by [`IssuancePipeline`](crate::IssuancePipeline).
///
/// Wraps the originating crate error; [`IssueError::kind`] reports its kind
/// unchanged.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Wallet session error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Storage or upload error.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl IssueError {
    /// The taxonomy kind of the originating error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::Upload(e) => e.kind(),
        }
    }

    /// Whether the network may have charged for the failed operation.
    pub fn charge_possible(&self) -> bool {
        self.kind().charge_possible()
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, IssueError>;

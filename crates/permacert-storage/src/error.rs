//! Error types for the storage module.

use permacert_core::{AtomicAmount, DisplayAmount, ErrorKind};
use thiserror::Error;

/// Errors reported by a storage network client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The client could not complete its readiness handshake.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The network or the signer refused the request.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The wallet session behind the signer ended.
    #[error("session lost: {0}")]
    SessionLost(String),

    /// The wallet cannot cover the price.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: AtomicAmount,
        available: AtomicAmount,
    },
}

/// Errors that can occur during uploader operations.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No connected wallet session to bind a client to.
    #[error("a connected wallet session is required")]
    SessionRequired,

    /// Client construction or readiness failed.
    #[error("storage client initialization failed: {0}")]
    ClientInitFailed(String),

    /// Price or balance lookup failed.
    #[error("price query failed: {0}")]
    PriceQueryFailed(String),

    /// The upload was refused, or the signature step failed.
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// Transport failure during or after submission. The upload may or may
    /// not have been charged.
    #[error("network error during upload: {0}")]
    Network(String),

    /// Funds were below the price at submission time.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: DisplayAmount,
        available: DisplayAmount,
    },

    /// The network acknowledged the upload without an id.
    #[error("upload acknowledged without a transaction id")]
    MissingTransactionId,
}

impl UploadError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionRequired => ErrorKind::SessionRequired,
            Self::ClientInitFailed(_) => ErrorKind::ClientInitFailed,
            Self::PriceQueryFailed(_) => ErrorKind::PriceQueryFailed,
            Self::Rejected(_) => ErrorKind::UploadRejected,
            Self::Network(_) | Self::MissingTransactionId => ErrorKind::UploadNetworkError,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
        }
    }
}

/// Result type for uploader operations.
pub type Result<T> = std::result::Result<T, UploadError>;

//! Error types for the session module.

use permacert_core::ErrorKind;
use thiserror::Error;

/// Errors reported by an identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user declined the request.
    #[error("request declined: {0}")]
    Declined(String),

    /// The provider went away (extension disabled, device unplugged).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// A capability needed for the call was never granted.
    #[error("capability not granted: {0}")]
    NotGranted(String),

    /// The provider has no active connection.
    #[error("provider not connected")]
    NotConnected,

    /// Anything else the provider reports.
    #[error("provider error: {0}")]
    Other(String),
}

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No identity provider is present.
    #[error("no identity provider available; install or enable a wallet")]
    ProviderUnavailable,

    /// The provider refused to connect or grant capabilities.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The address was requested while disconnected.
    #[error("wallet not connected")]
    NotConnected,

    /// A connected session is needed for this operation.
    #[error("a connected wallet session is required")]
    SessionRequired,

    /// A signer outlived the connection it was created for.
    #[error("session changed since the signer was created")]
    SessionExpired,

    /// The provider refused or failed to sign.
    #[error("signing failed: {0}")]
    Signing(#[source] ProviderError),
}

impl SessionError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::SessionRequired | Self::SessionExpired => ErrorKind::SessionRequired,
            Self::Signing(_) => ErrorKind::UploadRejected,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

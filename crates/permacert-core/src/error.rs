//! The error taxonomy shared by every Permacert crate.
//!
//! Each crate keeps its own `thiserror` enum, but every one of them maps onto
//! exactly one [`ErrorKind`]. The kind is what callers branch on; it is never
//! rewritten on the way up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure kinds an issuance can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No identity provider is installed or reachable.
    ProviderUnavailable,
    /// The provider exists but the user declined, or the capability grant failed.
    PermissionDenied,
    /// An address was requested while the session is disconnected.
    NotConnected,
    /// An operation needing a connected session ran without one.
    SessionRequired,
    /// The storage client could not be built or never reported ready.
    ClientInitFailed,
    /// The price or balance oracle failed.
    PriceQueryFailed,
    /// The network or the signer refused the upload.
    UploadRejected,
    /// Transport failure during or after submission.
    UploadNetworkError,
    /// Funds were below the price at submission time.
    InsufficientBalance,
    /// Secondary persistence failed. Never surfaced by `issue`.
    RecorderFailed,
}

impl ErrorKind {
    /// Whether the kind belongs to the connection phase.
    ///
    /// Hosts use this to steer the user towards installing or enabling the
    /// identity provider.
    pub fn is_connection_phase(self) -> bool {
        matches!(self, Self::ProviderUnavailable | Self::PermissionDenied)
    }

    /// Whether a charge may have happened even though the call failed.
    ///
    /// Only a transport failure around submission leaves the outcome
    /// unknown. Every other kind fails before anything is paid.
    pub fn charge_possible(self) -> bool {
        matches!(self, Self::UploadNetworkError)
    }

    /// Whether re-running the whole issuance is a sensible reaction.
    ///
    /// Nothing inside the crates retries on its own.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::PriceQueryFailed | Self::ClientInitFailed | Self::UploadNetworkError
        )
    }

    /// Stable name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "ProviderUnavailable",
            Self::PermissionDenied => "PermissionDenied",
            Self::NotConnected => "NotConnected",
            Self::SessionRequired => "SessionRequired",
            Self::ClientInitFailed => "ClientInitFailed",
            Self::PriceQueryFailed => "PriceQueryFailed",
            Self::UploadRejected => "UploadRejected",
            Self::UploadNetworkError => "UploadNetworkError",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::RecorderFailed => "RecorderFailed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

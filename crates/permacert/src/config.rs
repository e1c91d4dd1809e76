//! Pipeline configuration.

use std::time::Duration;

use permacert_core::NetworkMode;
use permacert_session::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SIGN_TIMEOUT};
use permacert_storage::StorageTimeouts;
use serde::{Deserialize, Serialize};

/// Application identity written into every certificate's tags.
///
/// `version` is the `App-Version` tag: bump it whenever a tag name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
    /// Issuer label recorded in the `emisor` tag.
    pub issuer: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: "Sistema-Certificados".into(),
            version: "1.0.0".into(),
            issuer: "Sistema-Certificados".into(),
        }
    }
}

/// Bounds on every point where the pipeline waits on an external actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Provider connect and capability grant.
    pub connect: Duration,
    /// Wallet signature prompt. Expiry rejects the upload before anything
    /// is submitted.
    pub sign: Duration,
    /// Storage client readiness handshake.
    pub ready: Duration,
    pub price: Duration,
    pub balance: Duration,
    /// Submission and response, not counting the signature prompt.
    pub upload: Duration,
}

impl Timeouts {
    /// The storage-side subset.
    ///
    /// The storage upload bound wraps the signature prompt, so it is
    /// widened by `sign` and a stalled wallet always hits the sign bound
    /// first.
    pub fn storage(&self) -> StorageTimeouts {
        StorageTimeouts {
            ready: self.ready,
            price: self.price,
            balance: self.balance,
            upload: self.upload.saturating_add(self.sign),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        let storage = StorageTimeouts::default();
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            sign: DEFAULT_SIGN_TIMEOUT,
            ready: storage.ready,
            price: storage.price,
            balance: storage.balance,
            upload: storage.upload,
        }
    }
}

/// Configuration for an [`IssuancePipeline`](crate::IssuancePipeline).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub network_mode: NetworkMode,
    pub app: AppIdentity,
    pub timeouts: Timeouts,
}

impl PipelineConfig {
    /// Select the network.
    pub fn with_network(mut self, mode: NetworkMode) -> Self {
        self.network_mode = mode;
        self
    }

    /// Replace the application identity.
    pub fn with_app(mut self, app: AppIdentity) -> Self {
        self.app = app;
        self
    }

    /// Replace the timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

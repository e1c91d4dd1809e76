//! The storage network client boundary.

use async_trait::async_trait;
use bytes::Bytes;
use permacert_core::{AtomicAmount, NetworkConfig, TagSet};
use permacert_session::SessionSigner;

use crate::error::ClientError;

/// Result type for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;

/// What the network returns for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    /// Network-assigned transaction id.
    pub id: String,
}

/// A client bound to one network and one signer.
///
/// Each async method waits on the remote network and may never complete;
/// the uploader bounds every call with a timeout.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Complete the readiness handshake.
    async fn ready(&self) -> Result<()>;

    /// Price of storing `size_bytes`, in atomic units.
    async fn get_price(&self, size_bytes: u64) -> Result<AtomicAmount>;

    /// Sign and submit `data` with `tags`.
    async fn upload(&self, data: Bytes, tags: &TagSet) -> Result<UploadResponse>;

    /// Funds available to the signer, in atomic units.
    async fn get_loaded_balance(&self) -> Result<AtomicAmount>;
}

/// Builds clients. One connector per network backend.
pub trait StorageConnector: Send + Sync {
    type Client: StorageClient;

    /// Construct a client for `network` that signs through `signer`.
    fn connect(&self, network: &NetworkConfig, signer: SessionSigner) -> Result<Self::Client>;
}

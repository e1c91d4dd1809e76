//! The uploader: one session-bound client, tag assembly, receipts.

use std::future::Future;
use std::time::Duration;

use permacert_core::{
    now_millis, Artifact, DisplayAmount, ExtraMetadata, NetworkConfig, NetworkMode, TagSet,
    TransactionId, UploadReceipt,
};
use permacert_session::WalletSession;

use crate::client::{StorageClient, StorageConnector};
use crate::cost::CostEstimate;
use crate::error::{ClientError, Result, UploadError};

/// Bounds on each storage-network round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTimeouts {
    pub ready: Duration,
    pub price: Duration,
    pub balance: Duration,
    pub upload: Duration,
}

impl Default for StorageTimeouts {
    fn default() -> Self {
        Self {
            ready: Duration::from_secs(30),
            price: Duration::from_secs(15),
            balance: Duration::from_secs(15),
            upload: Duration::from_secs(120),
        }
    }
}

/// A client together with the session epoch it was built for.
struct BoundClient<C> {
    client: C,
    epoch: u64,
    signer_label: String,
}

/// Uploads artifacts under the active wallet session's signature.
///
/// The client is built lazily and rebuilt whenever the session epoch moves
/// on, so a disconnect or reconnect never leaves a stale signer in use.
pub struct StorageUploader<K: StorageConnector> {
    connector: K,
    network: NetworkConfig,
    timeouts: StorageTimeouts,
    bound: Option<BoundClient<K::Client>>,
}

impl<K: StorageConnector> StorageUploader<K> {
    /// Create an uploader for a network mode.
    pub fn new(connector: K, mode: NetworkMode) -> Self {
        Self::with_network(connector, NetworkConfig::for_mode(mode))
    }

    /// Create an uploader for an explicit network entry.
    pub fn with_network(connector: K, network: NetworkConfig) -> Self {
        Self {
            connector,
            network,
            timeouts: StorageTimeouts::default(),
            bound: None,
        }
    }

    /// Replace the round-trip bounds.
    pub fn with_timeouts(mut self, timeouts: StorageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The network this uploader targets.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// The connector clients are built from.
    pub fn connector(&self) -> &K {
        &self.connector
    }

    /// Whether a client exists for the session's current epoch.
    pub fn is_initialized_for(&self, session: &WalletSession) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|b| session.is_connected() && b.epoch == session.epoch())
    }

    /// Drop the client. The next call re-initializes.
    pub fn reset(&mut self) {
        if self.bound.take().is_some() {
            tracing::debug!(network = %self.network.mode, "storage client dropped");
        }
    }

    /// Build a client bound to the session and wait until it is ready.
    pub async fn initialize(&mut self, session: &WalletSession) -> Result<&K::Client> {
        self.bound = None;

        let signer = session.signer().map_err(|_| UploadError::SessionRequired)?;
        let epoch = signer.epoch();
        let signer_label = signer.label().to_string();

        let client = self
            .connector
            .connect(&self.network, signer)
            .map_err(|e| UploadError::ClientInitFailed(e.to_string()))?;

        bounded(self.timeouts.ready, client.ready())
            .await
            .map_err(|e| UploadError::ClientInitFailed(e.to_string()))?;

        tracing::info!(
            network = %self.network.name,
            endpoint = %self.network.endpoint_url,
            epoch,
            "storage client ready"
        );

        let bound = self.bound.insert(BoundClient {
            client,
            epoch,
            signer_label,
        });
        Ok(&bound.client)
    }

    /// Price of storing `size_bytes`, normalized to display units.
    pub async fn estimate(
        &mut self,
        session: &WalletSession,
        size_bytes: u64,
    ) -> Result<CostEstimate> {
        self.ensure_client(session).await?;
        self.quote(size_bytes).await
    }

    /// Funds available to the session, in display units.
    pub async fn balance(&mut self, session: &WalletSession) -> Result<DisplayAmount> {
        self.ensure_client(session).await?;
        let bound = self.bound.as_ref().ok_or(UploadError::SessionRequired)?;
        let atomic = bounded(self.timeouts.balance, bound.client.get_loaded_balance())
            .await
            .map_err(|e| UploadError::PriceQueryFailed(e.to_string()))?;
        Ok(self.network.from_atomic(atomic))
    }

    /// Upload an artifact.
    ///
    /// The stored tags are `base_tags` followed by one tag per present entry
    /// of `extra`. The price is quoted right before submission and kept in
    /// the receipt; the network re-checks funds itself.
    pub async fn upload(
        &mut self,
        session: &WalletSession,
        artifact: &Artifact,
        base_tags: &TagSet,
        extra: &ExtraMetadata,
    ) -> Result<UploadReceipt> {
        self.ensure_client(session).await?;
        let tags = TagSet::assemble(base_tags, extra);

        let quote = self.quote(artifact.len()).await?;
        tracing::debug!(
            size_bytes = artifact.len(),
            tags = tags.len(),
            cost = %quote,
            "submitting upload"
        );

        let bound = self.bound.as_ref().ok_or(UploadError::SessionRequired)?;
        let response = bounded(
            self.timeouts.upload,
            bound.client.upload(artifact.bytes.clone(), &tags),
        )
        .await
        .map_err(|e| self.upload_error(e))?;

        if response.id.is_empty() {
            return Err(UploadError::MissingTransactionId);
        }

        let receipt = UploadReceipt {
            permanent_url: self.network.permanent_url(&response.id),
            transaction_id: TransactionId::new(response.id),
            size_bytes: artifact.len(),
            estimated_cost: quote.display,
            network_name: self.network.mode.key().to_string(),
            signer_label: bound.signer_label.clone(),
            issued_at: now_millis(),
        };

        tracing::info!(
            transaction_id = %receipt.transaction_id,
            url = %receipt.permanent_url,
            cost = %quote,
            "upload accepted"
        );
        Ok(receipt)
    }

    async fn ensure_client(&mut self, session: &WalletSession) -> Result<()> {
        if !session.is_connected() {
            self.reset();
            return Err(UploadError::SessionRequired);
        }
        if !self.is_initialized_for(session) {
            self.initialize(session).await?;
        }
        Ok(())
    }

    async fn quote(&self, size_bytes: u64) -> Result<CostEstimate> {
        let bound = self.bound.as_ref().ok_or(UploadError::SessionRequired)?;
        let atomic = bounded(self.timeouts.price, bound.client.get_price(size_bytes))
            .await
            .map_err(|e| UploadError::PriceQueryFailed(e.to_string()))?;
        Ok(CostEstimate::new(&self.network, size_bytes, atomic))
    }

    fn upload_error(&self, e: ClientError) -> UploadError {
        match e {
            ClientError::InsufficientFunds {
                required,
                available,
            } => UploadError::InsufficientBalance {
                required: self.network.from_atomic(required),
                available: self.network.from_atomic(available),
            },
            ClientError::Rejected(msg) => UploadError::Rejected(msg),
            ClientError::SessionLost(msg) => {
                tracing::warn!(reason = %msg, "wallet session ended during upload");
                UploadError::SessionRequired
            }
            ClientError::Transport(msg) | ClientError::Handshake(msg) => UploadError::Network(msg),
        }
    }
}

/// Await `fut`, turning an elapsed deadline into a transport error.
async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = std::result::Result<T, ClientError>>,
) -> std::result::Result<T, ClientError> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(ClientError::Transport(format!("no response within {limit:?}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryConnector, MemoryNetwork, Pricing};
    use permacert_core::{
        names, AtomicAmount, DocumentGenerator, ErrorKind, MetadataField, SubjectFields,
    };
    use permacert_session::memory::MemoryProvider;
    use permacert_session::{Capability, IdentityProvider};
    use std::sync::Arc;

    struct Setup {
        network: Arc<MemoryNetwork>,
        provider: Arc<MemoryProvider>,
        session: WalletSession,
        uploader: StorageUploader<MemoryConnector>,
    }

    async fn setup() -> Setup {
        let network = Arc::new(MemoryNetwork::new(Pricing::default()));
        let provider = Arc::new(MemoryProvider::from_seed("Arweave.app", [9u8; 32]));
        let session = WalletSession::new(provider.clone());
        let address = session.connect(&Capability::REQUIRED).await.unwrap();
        network.fund(&address, AtomicAmount(1_000_000_000_000));
        let uploader =
            StorageUploader::new(MemoryConnector::new(network.clone()), NetworkMode::Testnet);
        Setup {
            network,
            provider,
            session,
            uploader,
        }
    }

    fn artifact() -> Artifact {
        DocumentGenerator::default()
            .generate_at(&SubjectFields::new("Ana", "Rust 101", "2024-05-01"), 1_714_564_800_000)
    }

    #[tokio::test]
    async fn test_initialize_requires_session() {
        let mut s = setup().await;
        s.session.disconnect().await;

        let err = s.uploader.initialize(&s.session).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionRequired);
    }

    #[tokio::test]
    async fn test_upload_returns_receipt() {
        let mut s = setup().await;
        let artifact = artifact();
        let base = TagSet::new().with(names::CONTENT_TYPE, artifact.content_type.clone());
        let extra = ExtraMetadata::new().with(MetadataField::Issuee, "Ana");

        let receipt = s
            .uploader
            .upload(&s.session, &artifact, &base, &extra)
            .await
            .unwrap();

        assert!(!receipt.transaction_id.is_empty());
        assert_eq!(
            receipt.permanent_url,
            format!("https://arweave.net/{}", receipt.transaction_id)
        );
        assert_eq!(receipt.size_bytes, artifact.bytes.len() as u64);
        assert_eq!(receipt.network_name, "testnet");
        assert_eq!(receipt.signer_label, "Arweave.app");

        let stored = s.network.item(receipt.transaction_id.as_str()).unwrap();
        assert_eq!(stored.data, artifact.bytes);
        assert_eq!(stored.tags.get("tallerista"), Some("Ana"));
        assert!(stored.verify());
    }

    #[tokio::test]
    async fn test_upload_skips_empty_metadata() {
        let mut s = setup().await;
        let mut extra = ExtraMetadata::new();
        extra.insert_custom("a", Some("x".into()));
        extra.insert_custom("b", Some(String::new()));
        extra.insert_custom("c", None);

        let receipt = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &extra)
            .await
            .unwrap();

        let stored = s.network.item(receipt.transaction_id.as_str()).unwrap();
        assert_eq!(stored.tags.get("a"), Some("x"));
        assert!(!stored.tags.contains("b"));
        assert!(!stored.tags.contains("c"));
    }

    #[tokio::test]
    async fn test_estimate_is_monotonic() {
        let mut s = setup().await;
        let mut last = DisplayAmount::default();
        for size in [0u64, 1, 10, 1_000, 262_144, 10_000_000] {
            let quote = s.uploader.estimate(&s.session, size).await.unwrap();
            assert!(quote.display >= last);
            last = quote.display;
        }
    }

    #[tokio::test]
    async fn test_balance_in_display_units() {
        let mut s = setup().await;
        let balance = s.uploader.balance(&s.session).await.unwrap();
        assert_eq!(balance.to_string(), "1");
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let network = Arc::new(MemoryNetwork::new(Pricing::default()));
        let provider = Arc::new(MemoryProvider::generate("Arweave.app"));
        let session = WalletSession::new(provider);
        session.connect(&Capability::REQUIRED).await.unwrap();
        let mut uploader =
            StorageUploader::new(MemoryConnector::new(network.clone()), NetworkMode::Testnet);

        let err = uploader
            .upload(&session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(network.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_refused_signature_is_rejected() {
        let mut s = setup().await;
        s.provider.set_refuse_signing(true);

        let err = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UploadRejected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_signature_is_rejected() {
        let mut s = setup().await;
        s.provider.set_stall_signing(true);

        let err = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Rejected(_)));
        assert!(!err.kind().charge_possible());
        assert_eq!(s.network.upload_count(), 0);
        assert!(s.session.is_connected());
    }

    #[tokio::test]
    async fn test_revoked_session_requires_reconnect() {
        let mut s = setup().await;
        s.uploader.initialize(&s.session).await.unwrap();
        IdentityProvider::disconnect(s.provider.as_ref()).await.unwrap();

        let err = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SessionRequired);
        assert!(!s.session.is_connected());
        assert!(!s.uploader.is_initialized_for(&s.session));
        assert_eq!(s.network.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_price_failure() {
        let mut s = setup().await;
        s.network.set_fail_price(true);

        let err = s.uploader.estimate(&s.session, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PriceQueryFailed);
    }

    #[tokio::test]
    async fn test_handshake_failure() {
        let mut s = setup().await;
        s.network.set_fail_ready(true);

        let err = s.uploader.initialize(&s.session).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInitFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_handshake_times_out() {
        let mut s = setup().await;
        s.network.set_stall_ready(true);

        let err = s.uploader.initialize(&s.session).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInitFailed);
    }

    #[tokio::test]
    async fn test_lost_response_is_network_error() {
        let mut s = setup().await;
        s.network.set_drop_upload_response(true);

        let err = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UploadNetworkError);
        assert!(err.kind().charge_possible());
        assert_eq!(s.network.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_id_is_network_error() {
        let mut s = setup().await;
        s.network.set_blank_ids(true);

        let err = s
            .uploader
            .upload(&s.session, &artifact(), &TagSet::new(), &ExtraMetadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingTransactionId));
        assert_eq!(err.kind(), ErrorKind::UploadNetworkError);
    }

    #[tokio::test]
    async fn test_client_rebuilt_after_reconnect() {
        let mut s = setup().await;
        s.uploader.initialize(&s.session).await.unwrap();
        assert!(s.uploader.is_initialized_for(&s.session));

        s.session.disconnect().await;
        assert!(!s.uploader.is_initialized_for(&s.session));

        s.session.connect(&Capability::REQUIRED).await.unwrap();
        s.uploader.balance(&s.session).await.unwrap();
        assert!(s.uploader.is_initialized_for(&s.session));
        assert_eq!(s.network.clients_built(), 2);
    }
}

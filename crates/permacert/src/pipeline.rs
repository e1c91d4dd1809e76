//! The issuance pipeline.

use std::sync::Arc;

use permacert_core::{
    digest, names, Artifact, CertificateRecord, DisplayAmount, DocumentGenerator, ExtraMetadata,
    MetadataField, NetworkConfig, SubjectFields, TagSet, RECORD_TYPE,
};
use permacert_ledger::{LogRecorder, MetadataRecorder};
use permacert_session::{Capability, WalletAddress, WalletSession};
use permacert_storage::{CostEstimate, StorageConnector, StorageUploader};
use tokio::sync::Mutex;

use crate::config::PipelineConfig;
use crate::error::Result;

/// What a successful [`IssuancePipeline::connect`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub address: WalletAddress,
    /// First and last eight characters of the address.
    pub short_address: String,
    /// Funds available for uploads, in display units.
    pub balance: DisplayAmount,
    /// Network mode key.
    pub network_name: String,
}

/// Owns a wallet session, the storage uploader bound to it, and a recorder.
///
/// Issuances on one pipeline are serialized: the uploader sits behind an
/// async mutex held for the whole of each [`issue`](Self::issue) call.
pub struct IssuancePipeline<K: StorageConnector> {
    config: PipelineConfig,
    network: NetworkConfig,
    session: WalletSession,
    uploader: Mutex<StorageUploader<K>>,
    recorder: Arc<dyn MetadataRecorder>,
    generator: DocumentGenerator,
}

impl<K: StorageConnector> IssuancePipeline<K> {
    /// Create a pipeline.
    pub fn new(
        session: WalletSession,
        connector: K,
        recorder: Arc<dyn MetadataRecorder>,
        config: PipelineConfig,
    ) -> Self {
        let network = NetworkConfig::for_mode(config.network_mode);
        let uploader = StorageUploader::with_network(connector, network.clone())
            .with_timeouts(config.timeouts.storage());
        Self {
            session: session
                .with_timeout(config.timeouts.connect)
                .with_sign_timeout(config.timeouts.sign),
            uploader: Mutex::new(uploader),
            recorder,
            generator: DocumentGenerator::new(config.network_mode),
            network,
            config,
        }
    }

    /// Create a pipeline that records to the log, with default configuration.
    pub fn with_defaults(session: WalletSession, connector: K) -> Self {
        Self::new(
            session,
            connector,
            Arc::new(LogRecorder::new()),
            PipelineConfig::default(),
        )
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The target network.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Connect the wallet, warm up the storage client and read the balance.
    ///
    /// If the storage side fails, the session stays connected and the error
    /// is returned; the client is rebuilt on the next operation.
    pub async fn connect(&self) -> Result<ConnectionSummary> {
        let address = self.session.connect(&Capability::REQUIRED).await?;

        let mut uploader = self.uploader.lock().await;
        uploader.initialize(&self.session).await?;
        let balance = uploader.balance(&self.session).await?;

        tracing::info!(
            address = %address.short(),
            balance = %balance,
            symbol = %self.network.token_symbol,
            network = %self.network.name,
            "pipeline ready"
        );

        Ok(ConnectionSummary {
            short_address: address.short(),
            address,
            balance,
            network_name: self.network.mode.key().to_string(),
        })
    }

    /// Disconnect the wallet and drop the storage client. Idempotent.
    pub async fn disconnect(&self) {
        let mut uploader = self.uploader.lock().await;
        uploader.reset();
        self.session.disconnect().await;
    }

    /// Price of storing `size_bytes`.
    pub async fn estimate(&self, size_bytes: u64) -> Result<CostEstimate> {
        let mut uploader = self.uploader.lock().await;
        Ok(uploader.estimate(&self.session, size_bytes).await?)
    }

    /// Funds available for uploads.
    pub async fn balance(&self) -> Result<DisplayAmount> {
        let mut uploader = self.uploader.lock().await;
        Ok(uploader.balance(&self.session).await?)
    }

    /// Issue one certificate.
    pub async fn issue(&self, fields: &SubjectFields) -> Result<CertificateRecord> {
        let mut uploader = self.uploader.lock().await;

        let signer = self.session.signer()?;
        tracing::debug!(issuee = %fields.issuee, course = %fields.course, "issuing certificate");

        let artifact = self.generator.generate(fields);
        let digest = digest(&artifact);
        tracing::debug!(digest = %digest, size_bytes = artifact.len(), "document generated");

        let base_tags = self.base_tags(&artifact, signer.label());
        let extra = self.extra_metadata(fields, &digest.to_hex());

        let receipt = uploader
            .upload(&self.session, &artifact, &base_tags, &extra)
            .await?;
        drop(uploader);

        let record = CertificateRecord::from_receipt(&receipt, fields, &digest);
        self.dispatch(record.clone());

        tracing::info!(
            transaction_id = %record.transaction_id,
            url = %record.permanent_url,
            "certificate issued"
        );
        Ok(record)
    }

    /// Tags every certificate carries, in wire order.
    fn base_tags(&self, artifact: &Artifact, signer_label: &str) -> TagSet {
        TagSet::new()
            .with(names::CONTENT_TYPE, artifact.content_type.as_str())
            .with(names::APP_NAME, self.config.app.name.as_str())
            .with(names::APP_VERSION, self.config.app.version.as_str())
            .with(names::WALLET, signer_label)
            .with(names::NETWORK, self.network.mode.key())
            .with(names::TYPE, RECORD_TYPE)
            .with(names::TIMESTAMP, artifact.generated_at.to_string())
    }

    fn extra_metadata(&self, fields: &SubjectFields, digest_hex: &str) -> ExtraMetadata {
        ExtraMetadata::new()
            .with(MetadataField::Issuee, &fields.issuee)
            .with(MetadataField::Course, &fields.course)
            .with(MetadataField::Date, &fields.date)
            .with(MetadataField::Digest, digest_hex)
            .with(MetadataField::Issuer, &self.config.app.issuer)
            .with(MetadataField::Version, &self.config.app.version)
    }

    /// Hand the record to the recorder without waiting for it.
    fn dispatch(&self, record: CertificateRecord) {
        let recorder = Arc::clone(&self.recorder);
        tokio::spawn(async move {
            if let Err(e) = recorder.record(&record).await {
                tracing::warn!(
                    transaction_id = %record.transaction_id,
                    kind = %e.kind(),
                    error = %e,
                    "failed to record certificate"
                );
            }
        });
    }
}

impl<K: StorageConnector> std::fmt::Debug for IssuancePipeline<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuancePipeline")
            .field("network", &self.network.name)
            .field("session", &self.session)
            .finish()
    }
}

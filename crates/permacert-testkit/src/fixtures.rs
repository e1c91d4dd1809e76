//! Test fixtures and helpers.
//!
//! A pipeline wired to an in-memory provider, network and recorder, with
//! handles to each so tests can steer and inspect them.

use std::sync::Arc;

use permacert::{IssuancePipeline, PipelineConfig, WalletAddress, WalletSession};
use permacert_core::AtomicAmount;
use permacert_ledger::MemoryRecorder;
use permacert_session::memory::MemoryProvider;
use permacert_storage::{MemoryConnector, MemoryNetwork, Pricing};

/// Label of the fixture's identity provider.
pub const PROVIDER_LABEL: &str = "Arweave.app";

/// A pipeline over in-memory collaborators.
pub struct TestFixture {
    pub pipeline: IssuancePipeline<MemoryConnector>,
    pub provider: Arc<MemoryProvider>,
    pub network: Arc<MemoryNetwork>,
    pub recorder: Arc<MemoryRecorder>,
}

impl TestFixture {
    /// Create a disconnected fixture with a random key.
    pub fn new() -> Self {
        Self::build(MemoryProvider::generate(PROVIDER_LABEL), PipelineConfig::default())
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::build(
            MemoryProvider::from_seed(PROVIDER_LABEL, seed),
            PipelineConfig::default(),
        )
    }

    /// Create with a custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self::build(MemoryProvider::generate(PROVIDER_LABEL), config)
    }

    /// Create, fund with `atomic` units and connect.
    ///
    /// # Panics
    ///
    /// If the in-memory connect fails.
    pub async fn connected(atomic: u128) -> Self {
        let fixture = Self::new();
        fixture.fund(atomic);
        fixture
            .pipeline
            .connect()
            .await
            .expect("in-memory connect succeeds");
        fixture
    }

    fn build(provider: MemoryProvider, config: PipelineConfig) -> Self {
        let provider = Arc::new(provider);
        let network = Arc::new(MemoryNetwork::new(Pricing::default()));
        let recorder = Arc::new(MemoryRecorder::new());
        let pipeline = IssuancePipeline::new(
            WalletSession::new(provider.clone()),
            MemoryConnector::new(Arc::clone(&network)),
            recorder.clone(),
            config,
        );
        Self {
            pipeline,
            provider,
            network,
            recorder,
        }
    }

    /// The fixture wallet's address, connected or not.
    pub fn address(&self) -> WalletAddress {
        self.provider.public_key_now().address()
    }

    /// Credit the fixture wallet.
    pub fn fund(&self, atomic: u128) {
        self.network.fund(&self.address(), AtomicAmount(atomic));
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

//! End-to-end issuance against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use permacert::core::AtomicAmount;
use permacert::ledger::{MemoryRecorder, SqliteRecorder};
use permacert::session::memory::MemoryProvider;
use permacert::storage::{MemoryConnector, MemoryNetwork, Pricing};
use permacert::{
    ContentDigest, ErrorKind, IdentityProvider, IssuancePipeline, PipelineConfig, SubjectFields,
    Timeouts, WalletSession,
};

/// One AR in winston.
const ONE_AR: u128 = 1_000_000_000_000;

struct Harness {
    pipeline: IssuancePipeline<MemoryConnector>,
    provider: Arc<MemoryProvider>,
    network: Arc<MemoryNetwork>,
    recorder: Arc<MemoryRecorder>,
}

fn harness() -> Harness {
    harness_with(PipelineConfig::default())
}

fn harness_with(config: PipelineConfig) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let provider = Arc::new(MemoryProvider::from_seed("Arweave.app", [7u8; 32]));
    let network = Arc::new(MemoryNetwork::new(Pricing::default()));
    let recorder = Arc::new(MemoryRecorder::new());
    let pipeline = IssuancePipeline::new(
        WalletSession::new(provider.clone()),
        MemoryConnector::new(network.clone()),
        recorder.clone(),
        config,
    );
    Harness {
        pipeline,
        provider,
        network,
        recorder,
    }
}

fn ana() -> SubjectFields {
    SubjectFields::new("Ana", "Rust 101", "2024-05-01")
}

impl Harness {
    fn fund(&self, amount: u128) {
        let address = self.provider.public_key_now().address();
        self.network.fund(&address, AtomicAmount(amount));
    }
}

#[tokio::test]
async fn issue_end_to_end() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);

    let summary = h.pipeline.connect().await?;
    assert_eq!(summary.balance.to_string(), "1");
    assert_eq!(summary.network_name, "testnet");
    assert_eq!(summary.short_address.len(), 19);

    let record = h.pipeline.issue(&ana()).await?;

    assert!(!record.transaction_id.is_empty());
    assert!(record.permanent_url.contains(record.transaction_id.as_str()));
    assert_eq!(record.digest_hex.len(), 64);
    assert!(record
        .digest_hex
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    assert_eq!(record.subject, ana());
    assert_eq!(record.signer_label, "Arweave.app");
    assert_eq!(record.network_name, "testnet");

    let stored = h
        .network
        .item(record.transaction_id.as_str())
        .expect("upload stored");
    assert_eq!(record.size_bytes, stored.data.len() as u64);
    assert_eq!(ContentDigest::hash(&stored.data).to_hex(), record.digest_hex);
    assert!(stored.verify());

    let recorded = h.recorder.wait_for(1).await;
    assert_eq!(recorded, vec![record]);
    Ok(())
}

#[tokio::test]
async fn provider_absent_fails_connect() {
    let network = Arc::new(MemoryNetwork::new(Pricing::default()));
    let pipeline = IssuancePipeline::with_defaults(
        WalletSession::without_provider(),
        MemoryConnector::new(network.clone()),
    );

    let err = pipeline.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    assert!(err.kind().is_connection_phase());
    assert_eq!(network.clients_built(), 0);
    assert_eq!(network.upload_count(), 0);
}

#[tokio::test]
async fn declined_connect_is_permission_denied() {
    let h = harness();
    h.provider.set_decline_connect(true);

    let err = h.pipeline.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(!h.pipeline.session().is_connected());
}

#[tokio::test]
async fn insufficient_balance_propagates() -> Result<()> {
    let h = harness();
    h.pipeline.connect().await?;

    let err = h.pipeline.issue(&ana()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert!(!err.charge_possible());
    assert_eq!(h.network.upload_count(), 0);
    tokio::task::yield_now().await;
    assert!(h.recorder.is_empty());
    Ok(())
}

#[tokio::test]
async fn estimate_is_monotonic_in_size() -> Result<()> {
    let h = harness();
    h.pipeline.connect().await?;

    let mut last = h.pipeline.estimate(0).await?;
    for size in [1u64, 100, 4_096, 1 << 20, 1 << 30] {
        let quote = h.pipeline.estimate(size).await?;
        assert!(quote.atomic >= last.atomic);
        assert_eq!(quote.symbol, "AR");
        last = quote;
    }
    Ok(())
}

#[tokio::test]
async fn recorder_failure_is_swallowed() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.recorder.set_failure(Some("secondary store offline"));

    let record = h.pipeline.issue(&ana()).await?;

    assert!(!record.transaction_id.is_empty());
    assert_eq!(h.network.upload_count(), 1);
    Ok(())
}

#[tokio::test]
async fn lost_upload_response_may_have_charged() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.network.set_drop_upload_response(true);

    let err = h.pipeline.issue(&ana()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadNetworkError);
    assert!(err.charge_possible());
    assert_eq!(h.network.upload_count(), 1);
    assert!(h.network.balance_of(&h.provider.public_key_now().address()) < AtomicAmount(ONE_AR));
    Ok(())
}

#[tokio::test]
async fn refused_signature_is_rejected() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.provider.set_refuse_signing(true);

    let err = h.pipeline.issue(&ana()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadRejected);
    assert!(!err.charge_possible());
    assert_eq!(h.network.upload_count(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unanswered_signature_is_rejected_without_charge() -> Result<()> {
    let config = PipelineConfig::default().with_timeouts(Timeouts {
        sign: Duration::from_secs(5),
        upload: Duration::from_secs(5),
        ..Timeouts::default()
    });
    let h = harness_with(config);
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.provider.set_stall_signing(true);

    let err = h.pipeline.issue(&ana()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UploadRejected);
    assert!(!err.charge_possible());
    assert_eq!(h.network.upload_count(), 0);
    let owner = h.provider.public_key_now().address();
    assert_eq!(h.network.balance_of(&owner), AtomicAmount(ONE_AR));
    assert!(h.pipeline.session().is_connected());
    Ok(())
}

#[tokio::test]
async fn provider_revocation_requires_session() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    let epoch = h.pipeline.session().epoch();
    IdentityProvider::disconnect(h.provider.as_ref()).await?;

    let err = h.pipeline.issue(&ana()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionRequired);
    assert!(!h.pipeline.session().is_connected());
    assert_eq!(h.pipeline.session().epoch(), epoch + 1);
    assert_eq!(
        h.pipeline.session().active_address().unwrap_err().kind(),
        ErrorKind::NotConnected
    );

    let err = h.pipeline.issue(&ana()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionRequired);
    assert_eq!(h.network.upload_count(), 0);
    Ok(())
}

#[tokio::test]
async fn disconnect_then_issue_requires_session() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.pipeline.disconnect().await;

    assert_eq!(
        h.pipeline.session().active_address().unwrap_err().kind(),
        ErrorKind::NotConnected
    );
    let err = h.pipeline.issue(&ana()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionRequired);
    Ok(())
}

#[tokio::test]
async fn reconnect_issues_with_fresh_client() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.pipeline.disconnect().await;
    h.pipeline.connect().await?;

    let record = h.pipeline.issue(&ana()).await?;

    assert!(!record.transaction_id.is_empty());
    assert_eq!(h.network.clients_built(), 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_issues_are_serialized() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;

    let ana = ana();
    let bob = SubjectFields::new("Bob", "Rust 102", "2024-05-02");
    let (a, b) = tokio::join!(h.pipeline.issue(&ana), h.pipeline.issue(&bob));
    let (a, b) = (a?, b?);

    assert_ne!(a.transaction_id, b.transaction_id);
    assert_eq!(h.network.upload_count(), 2);
    assert_eq!(h.recorder.wait_for(2).await.len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_times_out() {
    let config = PipelineConfig::default().with_timeouts(Timeouts {
        connect: Duration::from_secs(5),
        ..Timeouts::default()
    });
    let h = harness_with(config);
    h.provider.set_stall_connect(true);

    let err = h.pipeline.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test(start_paused = true)]
async fn stalled_upload_times_out() -> Result<()> {
    let h = harness();
    h.fund(ONE_AR);
    h.pipeline.connect().await?;
    h.network.set_stall_upload(true);

    let err = h.pipeline.issue(&ana()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UploadNetworkError);
    Ok(())
}

#[tokio::test]
async fn sqlite_recorder_keeps_issued_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let recorder = Arc::new(SqliteRecorder::open(dir.path().join("ledger.db"))?);
    let provider = Arc::new(MemoryProvider::from_seed("Arweave.app", [8u8; 32]));
    let network = Arc::new(MemoryNetwork::new(Pricing::default()));
    network.fund(&provider.public_key_now().address(), AtomicAmount(ONE_AR));
    let pipeline = IssuancePipeline::new(
        WalletSession::new(provider),
        MemoryConnector::new(network),
        recorder.clone(),
        PipelineConfig::default(),
    );

    pipeline.connect().await?;
    let record = pipeline.issue(&ana()).await?;

    let mut stored = None;
    for _ in 0..100 {
        stored = recorder.get(&record.transaction_id).await?;
        if stored.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stored, Some(record.clone()));
    assert_eq!(recorder.by_digest(&record.digest_hex).await?, vec![record]);
    Ok(())
}

//! # Permacert
//!
//! Issue certificates whose integrity anyone can check later: the document
//! is generated, hashed, signed by the holder's wallet and stored on a
//! permanent, content-addressed network, tagged so it can be found again.
//!
//! ## Overview
//!
//! An [`IssuancePipeline`] owns a [`WalletSession`], a lazily built storage
//! client and a [`MetadataRecorder`]. One call to
//! [`IssuancePipeline::issue`] runs, strictly in order:
//!
//! 1. Require a connected session
//! 2. Generate the document
//! 3. Digest it (SHA-256)
//! 4. Assemble the base tags and the extra metadata
//! 5. Upload under the session's signature
//! 6. Build the [`CertificateRecord`]
//! 7. Hand the record to the recorder on a detached task
//! 8. Return the record
//!
//! Failures in steps 1 to 5 surface with their [`ErrorKind`] unchanged.
//! Recorder failures are logged and never fail an issuance.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use permacert::{IssuancePipeline, PipelineConfig, SubjectFields, WalletSession};
//! use permacert::ledger::LogRecorder;
//! use permacert::session::memory::MemoryProvider;
//! use permacert::storage::{MemoryConnector, MemoryNetwork, Pricing};
//!
//! async fn example() {
//!     let session = WalletSession::new(Arc::new(MemoryProvider::generate("Arweave.app")));
//!     let connector = MemoryConnector::new(Arc::new(MemoryNetwork::new(Pricing::default())));
//!     let pipeline = IssuancePipeline::new(
//!         session,
//!         connector,
//!         Arc::new(LogRecorder::new()),
//!         PipelineConfig::default(),
//!     );
//!
//!     let summary = pipeline.connect().await.unwrap();
//!     println!("connected {} ({})", summary.short_address, summary.balance);
//!
//!     let record = pipeline
//!         .issue(&SubjectFields::new("Ana", "Rust 101", "2024-05-01"))
//!         .await
//!         .unwrap();
//!     println!("{}", record.permanent_url);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `permacert::core` - Documents, digests, tags, amounts, networks
//! - `permacert::session` - Wallet session and identity providers
//! - `permacert::storage` - Storage clients and the uploader
//! - `permacert::ledger` - Metadata recorders

pub mod config;
pub mod error;
pub mod pipeline;

pub use permacert_core as core;
pub use permacert_ledger as ledger;
pub use permacert_session as session;
pub use permacert_storage as storage;

pub use config::{AppIdentity, PipelineConfig, Timeouts};
pub use error::{IssueError, Result};
pub use pipeline::{ConnectionSummary, IssuancePipeline};

pub use permacert_core::{
    CertificateRecord, ContentDigest, DisplayAmount, ErrorKind, NetworkConfig, NetworkMode,
    SubjectFields, TransactionId, UploadReceipt,
};
pub use permacert_ledger::MetadataRecorder;
pub use permacert_session::{IdentityProvider, WalletAddress, WalletSession};
pub use permacert_storage::{CostEstimate, StorageConnector};

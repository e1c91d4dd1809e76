//! # Permacert Ledger
//!
//! Secondary bookkeeping for issued certificates.
//!
//! ## Overview
//!
//! After a certificate is stored on the permanent network, the pipeline
//! forwards its [`CertificateRecord`] to a [`MetadataRecorder`]. Recording is
//! best-effort: the network is the source of truth, so a recorder failure is
//! logged and never undoes or fails an issuance.
//!
//! ## Key Types
//!
//! - [`MetadataRecorder`] - The async trait every backend implements
//! - [`LogRecorder`] - Emits each record as structured JSON through `tracing`
//! - [`SqliteRecorder`] - Durable rows keyed by transaction id
//! - [`MemoryRecorder`] - In-memory recorder for tests
//!
//! [`CertificateRecord`]: permacert_core::CertificateRecord

pub mod error;
pub mod log;
pub mod memory;
pub mod migration;
pub mod recorder;
pub mod sqlite;

pub use error::{RecorderError, Result};
pub use log::LogRecorder;
pub use memory::MemoryRecorder;
pub use recorder::MetadataRecorder;
pub use sqlite::SqliteRecorder;

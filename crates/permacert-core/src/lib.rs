//! # Permacert Core
//!
//! Pure primitives for certificate issuance: the certificate document, its
//! content digest, the descriptive tag schema, the network table and the
//! receipt/record value types.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! deterministic computation over values supplied by the caller.
//!
//! ## Key Types
//!
//! - [`DocumentGenerator`] - Renders [`SubjectFields`] into an [`Artifact`]
//! - [`ContentDigest`] - SHA-256 integrity anchor of an artifact
//! - [`TagSet`] / [`ExtraMetadata`] - The ordered tag wire format
//! - [`NetworkConfig`] - Embedded storage-network table keyed by [`NetworkMode`]
//! - [`UploadReceipt`] / [`CertificateRecord`] - Proof of issuance
//! - [`ErrorKind`] - The closed error taxonomy shared by every crate

pub mod amount;
pub mod digest;
pub mod document;
pub mod error;
pub mod network;
pub mod receipt;
pub mod tags;
pub mod time;

pub use amount::{AtomicAmount, DisplayAmount};
pub use digest::{digest, ContentDigest};
pub use document::{Artifact, DocumentGenerator, SubjectFields, TEXT_CONTENT_TYPE};
pub use error::ErrorKind;
pub use network::{NetworkConfig, NetworkMode};
pub use receipt::{CertificateRecord, TransactionId, UploadReceipt};
pub use tags::{is_present, names, ExtraMetadata, MetadataField, Tag, TagSet, RECORD_TYPE};
pub use time::{now_millis, to_iso8601};

//! # Permacert Storage
//!
//! Uploading artifacts to a permanent, content-addressed storage network.
//!
//! ## Overview
//!
//! The storage network itself is an external collaborator reached through
//! two traits:
//!
//! - [`StorageConnector`] - Builds a client for a [`NetworkConfig`] and a
//!   session signer
//! - [`StorageClient`] - `ready`, `get_price`, `upload`, `get_loaded_balance`
//!
//! On top of them, [`StorageUploader`] owns one lazily built client tied to
//! the current wallet session, quotes prices, assembles tags and produces
//! [`UploadReceipt`]s. [`memory::MemoryNetwork`] is an in-process network for
//! tests.
//!
//! ## Failure model
//!
//! Every suspension point is bounded by a timeout from [`StorageTimeouts`].
//! Nothing is retried: each upload is uniquely priced and signed, so a blind
//! retry risks paying twice.
//!
//! [`NetworkConfig`]: permacert_core::NetworkConfig
//! [`UploadReceipt`]: permacert_core::UploadReceipt

pub mod client;
pub mod cost;
pub mod error;
pub mod memory;
pub mod signing;
pub mod uploader;

pub use client::{StorageClient, StorageConnector, UploadResponse};
pub use cost::CostEstimate;
pub use error::{ClientError, Result, UploadError};
pub use memory::{MemoryClient, MemoryConnector, MemoryNetwork, Pricing, StoredItem};
pub use signing::signing_message;
pub use uploader::{StorageTimeouts, StorageUploader};

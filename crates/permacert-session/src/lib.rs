//! # Permacert Session
//!
//! The wallet session: a connect/disconnect lifecycle wrapped around an
//! externally supplied identity provider (a browser wallet, a hardware
//! signer, a local key).
//!
//! ## Overview
//!
//! - [`IdentityProvider`] - The async trait a signing-capable provider implements
//! - [`WalletSession`] - Owns the provider handle and the active address
//! - [`SessionSigner`] - A signing handle bound to one connection; it stops
//!   working as soon as the session disconnects or reconnects
//! - [`memory::MemoryProvider`] - In-process Ed25519 provider for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use permacert_session::{Capability, WalletSession};
//! use permacert_session::memory::MemoryProvider;
//!
//! async fn example() {
//!     let provider = Arc::new(MemoryProvider::generate("Arweave.app"));
//!     let session = WalletSession::new(provider);
//!
//!     let address = session.connect(&Capability::REQUIRED).await.unwrap();
//!     assert_eq!(session.active_address().unwrap(), address);
//!
//!     session.disconnect().await;
//!     assert!(session.active_address().is_err());
//! }
//! ```
//!
//! ## Invariants
//!
//! - The active address is present iff the session is connected.
//! - `disconnect` always leaves the session disconnected, even when the
//!   provider's own disconnect call fails.

pub mod crypto;
pub mod error;
pub mod memory;
pub mod provider;
pub mod session;

pub use crypto::{Keypair, PublicKey, Signature, WalletAddress};
pub use error::{ProviderError, Result, SessionError};
pub use provider::{Capability, IdentityProvider};
pub use session::{SessionSigner, WalletSession, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SIGN_TIMEOUT};

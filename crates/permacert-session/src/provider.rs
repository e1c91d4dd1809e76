//! The identity provider boundary.
//!
//! A provider is whatever holds the user's key: a browser extension, a
//! hardware device, a local keypair. Its presence is checked, never assumed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature, WalletAddress};
use crate::error::ProviderError;

/// Result type for provider calls.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Permissions requested from a provider on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    AccessAddress,
    SignTransaction,
    AccessPublicKey,
}

impl Capability {
    /// The capabilities every issuance needs.
    pub const REQUIRED: [Capability; 3] = [
        Capability::AccessAddress,
        Capability::SignTransaction,
        Capability::AccessPublicKey,
    ];

    /// Provider-facing permission name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessAddress => "ACCESS_ADDRESS",
            Self::SignTransaction => "SIGN_TRANSACTION",
            Self::AccessPublicKey => "ACCESS_PUBLIC_KEY",
        }
    }

    /// `requested` plus any missing [`REQUIRED`](Self::REQUIRED) capability,
    /// without duplicates, in request order.
    pub fn with_required(requested: &[Capability]) -> Vec<Capability> {
        let mut all: Vec<Capability> = Vec::with_capacity(requested.len() + 3);
        for cap in requested.iter().chain(Self::REQUIRED.iter()) {
            if !all.contains(cap) {
                all.push(*cap);
            }
        }
        all
    }
}

/// A signing-capable identity provider.
///
/// Implementations must be thread-safe (Send + Sync). Every async method is
/// a point where the caller waits on an external actor that may never
/// answer; callers bound them with a timeout.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Label shown to users and stamped into tags (e.g. `Arweave.app`).
    fn label(&self) -> &str;

    /// Ask the user to grant `capabilities`.
    async fn connect(&self, capabilities: &[Capability]) -> Result<()>;

    /// The address currently selected in the provider.
    async fn active_address(&self) -> Result<WalletAddress>;

    /// The public key behind the active address.
    async fn public_key(&self) -> Result<PublicKey>;

    /// Sign `message` with the active key.
    async fn sign(&self, message: &[u8]) -> Result<Signature>;

    /// Drop the provider-side connection.
    async fn disconnect(&self) -> Result<()>;
}

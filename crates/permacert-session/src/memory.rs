//! In-process identity provider backed by an Ed25519 keypair.
//!
//! Behaves like a wallet extension that the user always approves, with
//! switches to simulate a declined connect, a refused signature, a failing
//! disconnect or a provider that never answers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::crypto::{Keypair, PublicKey, Signature, WalletAddress};
use crate::error::ProviderError;
use crate::provider::{Capability, IdentityProvider, Result};

/// Keypair-backed provider for tests and local tooling.
pub struct MemoryProvider {
    label: String,
    keypair: Keypair,
    connected: AtomicBool,
    granted: Mutex<Vec<Capability>>,
    decline_connect: AtomicBool,
    stall_connect: AtomicBool,
    refuse_signing: AtomicBool,
    stall_signing: AtomicBool,
    fail_disconnect: AtomicBool,
    sign_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl MemoryProvider {
    /// Create a provider with a fresh random key.
    pub fn generate(label: impl Into<String>) -> Self {
        Self::with_keypair(label, Keypair::generate())
    }

    /// Create a provider with a deterministic key.
    pub fn from_seed(label: impl Into<String>, seed: [u8; 32]) -> Self {
        Self::with_keypair(label, Keypair::from_seed(&seed))
    }

    /// Create a provider around an existing keypair.
    pub fn with_keypair(label: impl Into<String>, keypair: Keypair) -> Self {
        Self {
            label: label.into(),
            keypair,
            connected: AtomicBool::new(false),
            granted: Mutex::new(Vec::new()),
            decline_connect: AtomicBool::new(false),
            stall_connect: AtomicBool::new(false),
            refuse_signing: AtomicBool::new(false),
            stall_signing: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            sign_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Public key, regardless of connection state.
    pub fn public_key_now(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Capabilities granted by the last successful connect.
    pub fn granted(&self) -> Vec<Capability> {
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make the next connects fail as if the user declined.
    pub fn set_decline_connect(&self, on: bool) {
        self.decline_connect.store(on, Ordering::SeqCst);
    }

    /// Make connect never complete.
    pub fn set_stall_connect(&self, on: bool) {
        self.stall_connect.store(on, Ordering::SeqCst);
    }

    /// Make sign requests fail as if the user rejected them.
    pub fn set_refuse_signing(&self, on: bool) {
        self.refuse_signing.store(on, Ordering::SeqCst);
    }

    /// Make sign requests never complete, like an ignored prompt.
    pub fn set_stall_signing(&self, on: bool) {
        self.stall_signing.store(on, Ordering::SeqCst);
    }

    /// Make the provider-side disconnect report an error.
    pub fn set_fail_disconnect(&self, on: bool) {
        self.fail_disconnect.store(on, Ordering::SeqCst);
    }

    /// Number of signatures requested so far.
    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    /// Number of disconnects requested so far.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::NotConnected)
        }
    }

    fn ensure_granted(&self, capability: Capability) -> Result<()> {
        if self.granted().contains(&capability) {
            Ok(())
        } else {
            Err(ProviderError::NotGranted(capability.as_str().to_string()))
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn connect(&self, capabilities: &[Capability]) -> Result<()> {
        if self.stall_connect.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.decline_connect.load(Ordering::SeqCst) {
            return Err(ProviderError::Declined("user rejected the connection".into()));
        }

        *self.granted.lock().unwrap_or_else(PoisonError::into_inner) = capabilities.to_vec();
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn active_address(&self) -> Result<WalletAddress> {
        self.ensure_connected()?;
        self.ensure_granted(Capability::AccessAddress)?;
        Ok(self.keypair.public_key().address())
    }

    async fn public_key(&self) -> Result<PublicKey> {
        self.ensure_connected()?;
        self.ensure_granted(Capability::AccessPublicKey)?;
        Ok(self.keypair.public_key())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_signing.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.ensure_connected()?;
        self.ensure_granted(Capability::SignTransaction)?;
        if self.refuse_signing.load(Ordering::SeqCst) {
            return Err(ProviderError::Declined("user rejected the signature".into()));
        }
        Ok(self.keypair.sign(message))
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(ProviderError::Other("extension did not respond".into()));
        }
        Ok(())
    }
}

//! The wallet session state machine.
//!
//! ```text
//!   Disconnected --connect ok--> Connected(epoch n)
//!   Connected    --connect ok--> Connected(epoch n+1)
//!   Connected    --disconnect--> Disconnected
//!   Connected    --revoked-----> Disconnected   (provider dropped us)
//!   Disconnected --disconnect--> Disconnected   (no-op)
//! ```
//!
//! Every successful connect, effective disconnect and revocation bumps the
//! epoch.
//! Anything built for an earlier epoch (signers, upload clients) is stale.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::crypto::{PublicKey, Signature, WalletAddress};
use crate::error::{ProviderError, Result, SessionError};
use crate::provider::{Capability, IdentityProvider};

/// Default bound on each provider round-trip during connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default bound on a signature prompt.
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct Connection {
    address: WalletAddress,
    public_key: PublicKey,
}

#[derive(Debug, Default)]
struct SessionState {
    connection: Option<Connection>,
    epoch: u64,
}

type SharedState = Arc<RwLock<SessionState>>;

fn read(state: &SharedState) -> RwLockReadGuard<'_, SessionState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(state: &SharedState) -> RwLockWriteGuard<'_, SessionState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

/// Drop the connection and bump the epoch.
///
/// With `only_epoch`, nothing happens unless the state is still in that
/// epoch. Returns whether a connection was dropped.
fn clear_connection(state: &SharedState, only_epoch: Option<u64>) -> bool {
    let mut state = write(state);
    if only_epoch.is_some_and(|epoch| epoch != state.epoch) {
        return false;
    }
    if state.connection.take().is_none() {
        return false;
    }
    state.epoch += 1;
    true
}

/// The single wallet session of an application instance.
pub struct WalletSession {
    provider: Option<Arc<dyn IdentityProvider>>,
    state: SharedState,
    timeout: Duration,
    sign_timeout: Duration,
}

impl WalletSession {
    /// Create a disconnected session around a provider.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::probe(Some(provider))
    }

    /// Create a disconnected session from whatever provider was detected.
    pub fn probe(provider: Option<Arc<dyn IdentityProvider>>) -> Self {
        Self {
            provider,
            state: Arc::new(RwLock::new(SessionState::default())),
            timeout: DEFAULT_CONNECT_TIMEOUT,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
        }
    }

    /// A session with no provider. `connect` fails with `ProviderUnavailable`.
    pub fn without_provider() -> Self {
        Self::probe(None)
    }

    /// Bound each provider call made during connect and disconnect.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound each signature prompt made through a [`SessionSigner`].
    pub fn with_sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = timeout;
        self
    }

    /// Whether an identity provider was detected.
    pub fn is_provider_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Label of the detected provider.
    pub fn provider_label(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.label())
    }

    /// Whether the session is connected.
    pub fn is_connected(&self) -> bool {
        read(&self.state).connection.is_some()
    }

    /// Current session epoch.
    pub fn epoch(&self) -> u64 {
        read(&self.state).epoch
    }

    /// Request `capabilities` (plus the required set) and connect.
    ///
    /// Returns the active address. Reconnecting an already connected
    /// session replaces the connection.
    pub async fn connect(&self, capabilities: &[Capability]) -> Result<WalletAddress> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(SessionError::ProviderUnavailable)?;

        let capabilities = Capability::with_required(capabilities);
        self.bounded(provider.connect(&capabilities))
            .await
            .map_err(connect_error)?;

        let address = self
            .bounded(provider.active_address())
            .await
            .map_err(connect_error)?;
        let public_key = self
            .bounded(provider.public_key())
            .await
            .map_err(connect_error)?;

        let epoch = {
            let mut state = write(&self.state);
            state.connection = Some(Connection {
                address: address.clone(),
                public_key,
            });
            state.epoch += 1;
            state.epoch
        };

        tracing::info!(
            provider = provider.label(),
            address = %address.short(),
            epoch,
            "wallet connected"
        );
        Ok(address)
    }

    /// Disconnect. Idempotent.
    ///
    /// Local state is cleared first and unconditionally. A failure of the
    /// provider's own disconnect is logged and otherwise ignored.
    pub async fn disconnect(&self) {
        if !clear_connection(&self.state, None) {
            return;
        }

        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        match self.bounded(provider.disconnect()).await {
            Ok(()) => tracing::info!(provider = provider.label(), "wallet disconnected"),
            Err(e) => tracing::warn!(
                provider = provider.label(),
                error = %e,
                "provider disconnect failed; local session cleared anyway"
            ),
        }
    }

    /// The active address.
    pub fn active_address(&self) -> Result<WalletAddress> {
        read(&self.state)
            .connection
            .as_ref()
            .map(|c| c.address.clone())
            .ok_or(SessionError::NotConnected)
    }

    /// The public key behind the active address.
    pub fn public_key(&self) -> Result<PublicKey> {
        read(&self.state)
            .connection
            .as_ref()
            .map(|c| c.public_key)
            .ok_or(SessionError::NotConnected)
    }

    /// A signing handle bound to the current connection.
    pub fn signer(&self) -> Result<SessionSigner> {
        let state = read(&self.state);
        let (Some(provider), Some(connection)) = (self.provider.as_ref(), state.connection.as_ref())
        else {
            return Err(SessionError::SessionRequired);
        };

        Ok(SessionSigner {
            provider: Arc::clone(provider),
            state: Arc::clone(&self.state),
            epoch: state.epoch,
            address: connection.address.clone(),
            public_key: connection.public_key,
            sign_timeout: self.sign_timeout,
        })
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = std::result::Result<T, ProviderError>>,
    ) -> std::result::Result<T, ProviderError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Other(format!(
                "no answer from provider within {:?}",
                self.timeout
            ))),
        }
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = read(&self.state);
        f.debug_struct("WalletSession")
            .field("provider", &self.provider_label())
            .field("address", &state.connection.as_ref().map(|c| &c.address))
            .field("epoch", &state.epoch)
            .finish()
    }
}

fn connect_error(e: ProviderError) -> SessionError {
    match e {
        ProviderError::Unavailable(_) => SessionError::ProviderUnavailable,
        other => SessionError::PermissionDenied(other.to_string()),
    }
}

/// Signing capability of one connection.
///
/// Cloned into upload clients. Once the session disconnects or reconnects,
/// every existing signer refuses to sign.
#[derive(Clone)]
pub struct SessionSigner {
    provider: Arc<dyn IdentityProvider>,
    state: SharedState,
    epoch: u64,
    address: WalletAddress,
    public_key: PublicKey,
    sign_timeout: Duration,
}

impl SessionSigner {
    /// Address of the signing wallet.
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// Public key of the signing wallet.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Provider label.
    pub fn label(&self) -> &str {
        self.provider.label()
    }

    /// Epoch this signer was created in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the connection this signer belongs to is still active.
    pub fn is_current(&self) -> bool {
        let state = read(&self.state);
        state.epoch == self.epoch && state.connection.is_some()
    }

    /// Sign through the provider.
    ///
    /// An unanswered prompt fails as a signing error once the sign timeout
    /// elapses. If the provider reports it is no longer connected, the
    /// session is cleared as if disconnected and the signer expires.
    pub async fn sign(&self, message: &[u8]) -> Result<Signature> {
        if !self.is_current() {
            return Err(SessionError::SessionExpired);
        }
        let result = tokio::time::timeout(self.sign_timeout, self.provider.sign(message))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Other(format!(
                    "no signature within {:?}",
                    self.sign_timeout
                )))
            });

        match result {
            Ok(signature) => Ok(signature),
            Err(ProviderError::NotConnected) => {
                if clear_connection(&self.state, Some(self.epoch)) {
                    tracing::warn!(
                        provider = self.provider.label(),
                        address = %self.address.short(),
                        "provider revoked the session"
                    );
                }
                Err(SessionError::SessionExpired)
            }
            Err(e) => Err(SessionError::Signing(e)),
        }
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("label", &self.label())
            .field("address", &self.address)
            .field("epoch", &self.epoch)
            .finish()
    }
}

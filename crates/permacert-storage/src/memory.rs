//! In-process storage network.
//!
//! Keeps balances and stored items in memory, prices uploads linearly and
//! checks every upload signature. Fault switches simulate the failures a
//! remote network produces.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use permacert_core::{AtomicAmount, ContentDigest, ErrorKind, NetworkConfig, TagSet};
use permacert_session::{PublicKey, SessionSigner, Signature, WalletAddress};

use crate::client::{Result, StorageClient, StorageConnector, UploadResponse};
use crate::error::ClientError;
use crate::signing::signing_message;

/// Linear price schedule in atomic units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub base_fee: u128,
    pub per_byte: u128,
}

impl Pricing {
    /// Price of `size_bytes`. Non-decreasing in size.
    pub fn price_for(&self, size_bytes: u64) -> AtomicAmount {
        AtomicAmount(
            self.per_byte
                .saturating_mul(u128::from(size_bytes))
                .saturating_add(self.base_fee),
        )
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            base_fee: 1_000_000,
            per_byte: 100_000,
        }
    }
}

/// An accepted upload as the network keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub id: String,
    pub data: Bytes,
    pub tags: TagSet,
    pub owner: WalletAddress,
    pub owner_key: PublicKey,
    pub signature: Signature,
    pub cost: AtomicAmount,
}

impl StoredItem {
    /// Check the owner's signature over data and tags.
    pub fn verify(&self) -> bool {
        self.owner_key
            .verify(&signing_message(&self.data, &self.tags), &self.signature)
    }
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<WalletAddress, AtomicAmount>,
    items: Vec<StoredItem>,
}

#[derive(Default)]
struct Faults {
    fail_ready: AtomicBool,
    stall_ready: AtomicBool,
    fail_price: AtomicBool,
    reject_upload: AtomicBool,
    drop_upload_response: AtomicBool,
    blank_ids: AtomicBool,
    stall_upload: AtomicBool,
}

/// Shared state of the in-process network.
#[derive(Default)]
pub struct MemoryNetwork {
    pricing: Pricing,
    ledger: RwLock<Ledger>,
    faults: Faults,
    clients_built: AtomicUsize,
}

impl MemoryNetwork {
    /// Create a network with a price schedule.
    pub fn new(pricing: Pricing) -> Self {
        Self {
            pricing,
            ..Self::default()
        }
    }

    /// Credit `amount` to `address`.
    pub fn fund(&self, address: &WalletAddress, amount: AtomicAmount) {
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
        let balance = ledger.balances.entry(address.clone()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Funds held by `address`.
    pub fn balance_of(&self, address: &WalletAddress) -> AtomicAmount {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        ledger.balances.get(address).copied().unwrap_or_default()
    }

    /// Price of `size_bytes` under this network's schedule.
    pub fn price_for(&self, size_bytes: u64) -> AtomicAmount {
        self.pricing.price_for(size_bytes)
    }

    /// Look up a stored item by id.
    pub fn item(&self, id: &str) -> Option<StoredItem> {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        ledger.items.iter().find(|i| i.id == id).cloned()
    }

    /// All stored items in acceptance order.
    pub fn items(&self) -> Vec<StoredItem> {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        ledger.items.clone()
    }

    /// Number of accepted (and charged) uploads.
    pub fn upload_count(&self) -> usize {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        ledger.items.len()
    }

    /// Number of clients built against this network.
    pub fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::SeqCst)
    }

    /// Fail the readiness handshake.
    pub fn set_fail_ready(&self, on: bool) {
        self.faults.fail_ready.store(on, Ordering::SeqCst);
    }

    /// Never answer the readiness handshake.
    pub fn set_stall_ready(&self, on: bool) {
        self.faults.stall_ready.store(on, Ordering::SeqCst);
    }

    /// Fail price and balance lookups.
    pub fn set_fail_price(&self, on: bool) {
        self.faults.fail_price.store(on, Ordering::SeqCst);
    }

    /// Refuse uploads before charging.
    pub fn set_reject_upload(&self, on: bool) {
        self.faults.reject_upload.store(on, Ordering::SeqCst);
    }

    /// Accept and charge uploads, then lose the response.
    pub fn set_drop_upload_response(&self, on: bool) {
        self.faults.drop_upload_response.store(on, Ordering::SeqCst);
    }

    /// Acknowledge uploads with an empty id.
    pub fn set_blank_ids(&self, on: bool) {
        self.faults.blank_ids.store(on, Ordering::SeqCst);
    }

    /// Never answer uploads.
    pub fn set_stall_upload(&self, on: bool) {
        self.faults.stall_upload.store(on, Ordering::SeqCst);
    }

    /// Charge the owner and store the item under a fresh id.
    ///
    /// The id commits to the signature and to the network's upload sequence,
    /// so byte-identical uploads still get distinct ids.
    fn accept(&self, mut item: StoredItem) -> Result<String> {
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
        let available = ledger.balances.get(&item.owner).copied().unwrap_or_default();
        if available < item.cost {
            return Err(ClientError::InsufficientFunds {
                required: item.cost,
                available,
            });
        }
        ledger
            .balances
            .insert(item.owner.clone(), available.saturating_sub(item.cost));

        let mut anchor = item.signature.as_bytes().to_vec();
        anchor.extend_from_slice(&(ledger.items.len() as u64).to_be_bytes());
        item.id = ContentDigest::hash(&anchor).to_hex();
        let id = item.id.clone();
        ledger.items.push(item);
        Ok(id)
    }
}

impl fmt::Debug for MemoryNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNetwork")
            .field("pricing", &self.pricing)
            .field("uploads", &self.upload_count())
            .field("clients_built", &self.clients_built())
            .finish_non_exhaustive()
    }
}

/// Builds [`MemoryClient`]s against a shared [`MemoryNetwork`].
#[derive(Clone)]
pub struct MemoryConnector {
    network: Arc<MemoryNetwork>,
}

impl MemoryConnector {
    pub fn new(network: Arc<MemoryNetwork>) -> Self {
        Self { network }
    }

    /// The network clients talk to.
    pub fn network(&self) -> &Arc<MemoryNetwork> {
        &self.network
    }
}

impl StorageConnector for MemoryConnector {
    type Client = MemoryClient;

    fn connect(&self, network: &NetworkConfig, signer: SessionSigner) -> Result<MemoryClient> {
        self.network.clients_built.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            network = %network.name,
            signer = %signer.address().short(),
            "memory client built"
        );
        Ok(MemoryClient {
            network: Arc::clone(&self.network),
            signer,
        })
    }
}

/// A client for one signer on a [`MemoryNetwork`].
pub struct MemoryClient {
    network: Arc<MemoryNetwork>,
    signer: SessionSigner,
}

impl fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryClient")
            .field("signer", &self.signer.address().short())
            .field("network", &self.network)
            .finish()
    }
}

impl MemoryClient {
    fn faults(&self) -> &Faults {
        &self.network.faults
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    async fn ready(&self) -> Result<()> {
        if self.faults().stall_ready.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.faults().fail_ready.load(Ordering::SeqCst) {
            return Err(ClientError::Handshake("node refused handshake".into()));
        }
        Ok(())
    }

    async fn get_price(&self, size_bytes: u64) -> Result<AtomicAmount> {
        if self.faults().fail_price.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("price endpoint unreachable".into()));
        }
        Ok(self.network.price_for(size_bytes))
    }

    async fn upload(&self, data: Bytes, tags: &TagSet) -> Result<UploadResponse> {
        if self.faults().stall_upload.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let message = signing_message(&data, tags);
        let signature = self
            .signer
            .sign(&message)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::SessionRequired => ClientError::SessionLost(e.to_string()),
                _ => ClientError::Rejected(e.to_string()),
            })?;
        let owner_key = self.signer.public_key();
        if !owner_key.verify(&message, &signature) {
            return Err(ClientError::Rejected("invalid signature".into()));
        }
        if self.faults().reject_upload.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected("upload refused by node".into()));
        }

        let item = StoredItem {
            id: String::new(),
            cost: self.network.price_for(data.len() as u64),
            data,
            tags: tags.clone(),
            owner: self.signer.address().clone(),
            owner_key,
            signature,
        };
        let id = self.network.accept(item)?;

        if self.faults().drop_upload_response.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection reset after submit".into()));
        }
        if self.faults().blank_ids.load(Ordering::SeqCst) {
            return Ok(UploadResponse { id: String::new() });
        }
        Ok(UploadResponse { id })
    }

    async fn get_loaded_balance(&self) -> Result<AtomicAmount> {
        if self.faults().fail_price.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("balance endpoint unreachable".into()));
        }
        Ok(self.network.balance_of(self.signer.address()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permacert_session::memory::MemoryProvider;
    use permacert_session::{Capability, WalletSession};
    use proptest::prelude::*;

    async fn client(network: &Arc<MemoryNetwork>) -> (WalletSession, MemoryClient) {
        let session = WalletSession::new(Arc::new(MemoryProvider::from_seed("test", [3u8; 32])));
        session.connect(&Capability::REQUIRED).await.unwrap();
        let connector = MemoryConnector::new(Arc::clone(network));
        let client = connector
            .connect(&NetworkConfig::default(), session.signer().unwrap())
            .unwrap();
        (session, client)
    }

    proptest! {
        #[test]
        fn prop_price_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let pricing = Pricing::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(pricing.price_for(lo) <= pricing.price_for(hi));
        }
    }

    #[tokio::test]
    async fn test_upload_charges_owner() {
        let network = Arc::new(MemoryNetwork::default());
        let (session, client) = client(&network).await;
        let owner = session.active_address().unwrap();
        network.fund(&owner, AtomicAmount(10_000_000_000));

        let data = Bytes::from_static(b"hello");
        let response = client.upload(data.clone(), &TagSet::new()).await.unwrap();

        let cost = network.price_for(5);
        assert_eq!(network.balance_of(&owner), AtomicAmount(10_000_000_000 - cost.value()));
        let item = network.item(&response.id).unwrap();
        assert_eq!(item.data, data);
        assert_eq!(item.owner, owner);
        assert!(item.verify());
    }

    #[tokio::test]
    async fn test_insufficient_funds_stores_nothing() {
        let network = Arc::new(MemoryNetwork::default());
        let (_session, client) = client(&network).await;

        let err = client
            .upload(Bytes::from_static(b"hello"), &TagSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InsufficientFunds { .. }));
        assert_eq!(network.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_signer_cannot_upload() {
        let network = Arc::new(MemoryNetwork::default());
        let (session, client) = client(&network).await;
        network.fund(&session.active_address().unwrap(), AtomicAmount(u128::MAX));
        session.disconnect().await;

        let err = client
            .upload(Bytes::from_static(b"hello"), &TagSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SessionLost(_)));
        assert_eq!(network.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_refused_signature_is_rejected() {
        let provider = Arc::new(MemoryProvider::from_seed("test", [4u8; 32]));
        let session = WalletSession::new(provider.clone());
        session.connect(&Capability::REQUIRED).await.unwrap();
        let network = Arc::new(MemoryNetwork::default());
        network.fund(&session.active_address().unwrap(), AtomicAmount(u128::MAX));
        let client = MemoryConnector::new(Arc::clone(&network))
            .connect(&NetworkConfig::default(), session.signer().unwrap())
            .unwrap();
        provider.set_refuse_signing(true);

        let err = client
            .upload(Bytes::from_static(b"hello"), &TagSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Rejected(_)));
        assert_eq!(network.upload_count(), 0);
    }

    #[test]
    fn test_tampered_item_fails_verification() {
        let keypair = permacert_session::Keypair::from_seed(&[1u8; 32]);
        let tags = TagSet::new().with("k", "v");
        let data = Bytes::from_static(b"payload");
        let signature = keypair.sign(&signing_message(&data, &tags));
        let mut item = StoredItem {
            id: "x".into(),
            data,
            tags,
            owner: keypair.public_key().address(),
            owner_key: keypair.public_key(),
            signature,
            cost: AtomicAmount::ZERO,
        };
        assert!(item.verify());

        item.tags = TagSet::new().with("k", "w");
        assert!(!item.verify());
    }
}

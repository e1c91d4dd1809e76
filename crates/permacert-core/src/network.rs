//! The embedded storage-network table.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::amount::{AtomicAmount, DisplayAmount};

/// Atomic-unit scale of the AR token (1 AR = 10^12 winston).
pub const AR_DECIMALS: u32 = 12;

/// Which network an issuance targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Production network; uploads cost real funds.
    Mainnet,
    /// Development network.
    #[default]
    Testnet,
}

impl NetworkMode {
    /// Resolve a mode key. Unknown keys fall back to [`NetworkMode::Testnet`].
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Self::Mainnet,
            _ => Self::Testnet,
        }
    }

    /// The mode key, as used in tags and records.
    pub fn key(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl FromStr for NetworkMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_key(s))
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Connection details of one storage network. Immutable after selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Which table entry this is.
    pub mode: NetworkMode,
    /// Human-readable network name.
    pub name: String,
    /// Bundler endpoint the client talks to.
    pub endpoint_url: String,
    /// Currency identifier handed to the client.
    pub token: String,
    /// Ticker shown next to display amounts.
    pub token_symbol: String,
    /// Gateway that resolves transaction ids to content.
    pub explorer_base_url: String,
    /// Fixed-point scale between atomic and display units.
    pub decimals: u32,
}

impl NetworkConfig {
    /// Look up the table entry for a mode.
    pub fn for_mode(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::Mainnet => Self {
                mode,
                name: "Irys Mainnet".into(),
                endpoint_url: "https://node1.irys.xyz".into(),
                token: "arweave".into(),
                token_symbol: "AR".into(),
                explorer_base_url: "https://arweave.net".into(),
                decimals: AR_DECIMALS,
            },
            NetworkMode::Testnet => Self {
                mode,
                name: "Irys DevNet - TESTNET".into(),
                endpoint_url: "https://devnet.irys.xyz".into(),
                token: "arweave".into(),
                token_symbol: "AR".into(),
                explorer_base_url: "https://arweave.net".into(),
                decimals: AR_DECIMALS,
            },
        }
    }

    /// Look up the table entry for a mode key, falling back to testnet.
    pub fn for_key(key: &str) -> Self {
        Self::for_mode(NetworkMode::from_key(key))
    }

    /// Convert an atomic amount into this network's display unit.
    pub fn from_atomic(&self, amount: AtomicAmount) -> DisplayAmount {
        amount.to_display(self.decimals)
    }

    /// Resolvable URL of a stored transaction.
    pub fn permanent_url(&self, transaction_id: &str) -> String {
        format!(
            "{}/{}",
            self.explorer_base_url.trim_end_matches('/'),
            transaction_id
        )
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_mode(NetworkMode::default())
    }
}

//! Price quotes.

use std::fmt;

use permacert_core::{AtomicAmount, DisplayAmount, NetworkConfig};

/// A price quote for storing a number of bytes.
///
/// Advisory only: the network re-prices at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate {
    pub size_bytes: u64,
    pub atomic: AtomicAmount,
    pub display: DisplayAmount,
    pub symbol: String,
}

impl CostEstimate {
    /// Normalize an atomic quote with the network's scale.
    pub fn new(network: &NetworkConfig, size_bytes: u64, atomic: AtomicAmount) -> Self {
        Self {
            size_bytes,
            atomic,
            display: network.from_atomic(atomic),
            symbol: network.token_symbol.clone(),
        }
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display, self.symbol)
    }
}

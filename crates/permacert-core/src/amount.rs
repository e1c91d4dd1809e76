//! Token amounts in atomic and display units.
//!
//! Storage networks price in their smallest indivisible unit (winston for
//! Arweave). Display amounts are the same integer with a fixed-point scale
//! attached, so conversion never loses precision and never reorders values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest scale a `u128` can represent.
pub const MAX_DECIMALS: u32 = 38;

/// An amount in the network's atomic unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AtomicAmount(pub u128);

impl AtomicAmount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create from a raw atomic value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Raw atomic value.
    pub const fn value(self) -> u128 {
        self.0
    }

    /// Convert into display units with the given number of decimals.
    pub fn to_display(self, decimals: u32) -> DisplayAmount {
        DisplayAmount::new(self, decimals)
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<u128> for AtomicAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for AtomicAmount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}

impl fmt::Display for AtomicAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount in display units: `atomic / 10^decimals`.
///
/// Ordering compares the atomic value first, which is the numeric order for
/// amounts that share a scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisplayAmount {
    atomic: AtomicAmount,
    decimals: u32,
}

impl DisplayAmount {
    /// Attach a scale to an atomic amount. Scales above [`MAX_DECIMALS`] are
    /// clamped.
    pub fn new(atomic: AtomicAmount, decimals: u32) -> Self {
        Self {
            atomic,
            decimals: decimals.min(MAX_DECIMALS),
        }
    }

    /// The underlying atomic amount.
    pub fn atomic(&self) -> AtomicAmount {
        self.atomic
    }

    /// Number of fractional digits.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Whole display units (truncated).
    pub fn whole(&self) -> u128 {
        self.atomic.0 / self.scale()
    }

    /// Fractional part in atomic units.
    pub fn fraction(&self) -> u128 {
        self.atomic.0 % self.scale()
    }

    fn scale(&self) -> u128 {
        10u128.pow(self.decimals)
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.whole();
        if self.decimals == 0 || self.fraction() == 0 {
            return write!(f, "{whole}");
        }
        let width = self.decimals as usize;
        let frac = format!("{:0width$}", self.fraction());
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_formatting() {
        assert_eq!(AtomicAmount(0).to_display(12).to_string(), "0");
        assert_eq!(AtomicAmount(1).to_display(12).to_string(), "0.000000000001");
        assert_eq!(
            AtomicAmount(1_500_000_000_000).to_display(12).to_string(),
            "1.5"
        );
        assert_eq!(
            AtomicAmount(2_000_000_000_000).to_display(12).to_string(),
            "2"
        );
        assert_eq!(AtomicAmount(1234).to_display(0).to_string(), "1234");
    }

    #[test]
    fn test_whole_and_fraction() {
        let amount = AtomicAmount(3_000_000_000_042).to_display(12);
        assert_eq!(amount.whole(), 3);
        assert_eq!(amount.fraction(), 42);
    }

    #[test]
    fn test_decimals_clamped() {
        let amount = AtomicAmount(u128::MAX).to_display(99);
        assert_eq!(amount.decimals(), MAX_DECIMALS);
        let _ = amount.to_string();
    }

    proptest! {
        #[test]
        fn conversion_preserves_order(a in any::<u64>(), b in any::<u64>()) {
            let da = AtomicAmount::from(a).to_display(12);
            let db = AtomicAmount::from(b).to_display(12);
            prop_assert_eq!(a.cmp(&b), da.cmp(&db));
        }
    }
}

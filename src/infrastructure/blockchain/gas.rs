//! # Gas Management
//!
//! Gas pricing and gas-limit estimation buffers.
//!
//! Transfers on the target network use legacy gas pricing: a single gas price
//! read from the node, and a gas limit taken from `eth_estimateGas` plus a
//! safety buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wei per gwei.
const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Legacy gas price in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GasPrice(u64);

impl GasPrice {
    /// Creates a gas price from wei.
    #[must_use]
    pub const fn new(wei: u64) -> Self {
        Self(wei)
    }

    /// Returns the price in wei.
    #[must_use]
    pub const fn wei(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_GWEI;
        let frac = self.0 % WEI_PER_GWEI;
        if frac == 0 {
            write!(f, "{} gwei", whole)
        } else {
            write!(f, "{} wei", self.0)
        }
    }
}

/// Gas estimator with configurable buffer.
///
/// Applies a percentage buffer to gas estimates to account for
/// estimation inaccuracies and state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimator {
    /// Buffer percentage to add to gas estimates (e.g., 20 for 20%).
    buffer_percent: u64,
}

impl GasEstimator {
    /// Default gas buffer percentage.
    pub const DEFAULT_BUFFER_PERCENT: u64 = 20;

    /// Creates a new gas estimator with the specified buffer.
    #[must_use]
    pub const fn new(buffer_percent: u64) -> Self {
        Self { buffer_percent }
    }

    /// Returns the buffer percentage.
    #[must_use]
    pub const fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Applies the buffer to a gas estimate, rounding down.
    #[must_use]
    pub fn apply_buffer(&self, estimate: u64) -> u64 {
        let extra = u128::from(estimate) * u128::from(self.buffer_percent) / 100;
        estimate.saturating_add(u64::try_from(extra).unwrap_or(u64::MAX))
    }

    /// Estimates the transaction cost in wei.
    #[must_use]
    pub fn estimate_cost(&self, gas_limit: u64, gas_price: GasPrice) -> u128 {
        u128::from(gas_limit) * u128::from(gas_price.wei())
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_PERCENT)
    }
}

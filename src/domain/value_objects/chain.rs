//! # Chain Identifier
//!
//! Numeric EIP-155 chain identifier of the target network.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// OneFinity test network.
    pub const ONEFINITY_TESTNET: Self = Self(999_987);

    /// Creates a chain identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric chain ID.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the chain ID as a `0x`-prefixed hex string, as wallets expect it.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::ONEFINITY_TESTNET
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

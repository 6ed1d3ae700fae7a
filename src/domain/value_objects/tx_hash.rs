//! # Transaction Hash

use ethers::types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(H256);

impl TxHash {
    /// Creates a new transaction hash.
    #[must_use]
    pub const fn new(hash: H256) -> Self {
        Self(hash)
    }

    /// Returns the raw hash.
    #[must_use]
    pub const fn as_h256(&self) -> H256 {
        self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<H256> for TxHash {
    fn from(hash: H256) -> Self {
        Self(hash)
    }
}

//! # Network Registration
//!
//! EIP-3085 `wallet_addEthereumChain` parameters for the target network.

use crate::domain::value_objects::ChainId;
use serde::{Deserialize, Serialize};

/// Native currency description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of fractional digits.
    pub decimals: u32,
}

/// Parameters describing a network to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Chain ID as a `0x`-prefixed hex string.
    pub chain_id: String,
    /// Human-readable network name.
    pub chain_name: String,
    /// RPC endpoints.
    pub rpc_urls: Vec<String>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Block explorers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl AddChainParams {
    /// Creates parameters for `chain_id`.
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        chain_name: impl Into<String>,
        rpc_url: impl Into<String>,
        native_currency: NativeCurrency,
    ) -> Self {
        Self {
            chain_id: chain_id.to_hex(),
            chain_name: chain_name.into(),
            rpc_urls: vec![rpc_url.into()],
            native_currency,
            block_explorer_urls: Vec::new(),
        }
    }

    /// Adds a block explorer URL.
    #[must_use]
    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.block_explorer_urls.push(url.into());
        self
    }

    /// Parses the hex chain ID back into a [`ChainId`].
    #[must_use]
    pub fn parsed_chain_id(&self) -> Option<ChainId> {
        let digits = self.chain_id.strip_prefix("0x")?;
        u64::from_str_radix(digits, 16).ok().map(ChainId::new)
    }
}

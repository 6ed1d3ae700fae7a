//! # Blockchain Client Trait
//!
//! Port definition for blockchain interactions.
//!
//! This module defines the [`BlockchainClient`] trait through which the
//! faucet service, the transaction dispatcher, and the balance monitor reach
//! the network. Signing and key management stay behind this trait.
//!
//! RPC failures are classified once, at the adapter boundary, into
//! [`BlockchainError`] kinds; callers decide on retries through
//! [`BlockchainError::is_transient`] instead of inspecting messages.

use crate::domain::entities::TransferIntent;
use crate::domain::value_objects::{ChainId, TxHash};
use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::gas::GasPrice;
use super::network::AddChainParams;

/// JSON-RPC "internal error" code.
pub const RPC_INTERNAL_ERROR_CODE: i64 = -32603;

/// Transaction receipt with confirmation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Block number where the transaction was included.
    pub block_number: Option<u64>,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Effective gas price paid, if the node reports it.
    pub effective_gas_price: Option<u64>,
    /// Whether the transaction succeeded.
    pub success: bool,
}

/// A fully specified native-currency transfer ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Sender.
    pub from: Address,
    /// Receiver.
    pub to: Address,
    /// Value in base units.
    pub value: u128,
    /// Target chain.
    pub chain_id: ChainId,
    /// Account nonce.
    pub nonce: Option<u64>,
    /// Gas limit.
    pub gas_limit: Option<u64>,
    /// Gas price.
    pub gas_price: Option<GasPrice>,
}

impl TransferRequest {
    /// Creates a request for `intent` with nonce and gas left to be filled in.
    #[must_use]
    pub fn from_intent(intent: &TransferIntent) -> Self {
        Self {
            from: intent.sender(),
            to: intent.receiver(),
            value: intent.value(),
            chain_id: intent.chain_id(),
            nonce: None,
            gas_limit: None,
            gas_price: None,
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Sets the gas limit.
    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Sets the gas price.
    #[must_use]
    pub fn with_gas_price(mut self, gas_price: GasPrice) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

/// Error type for blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// No signing wallet is available.
    #[error("no wallet provider: {0}")]
    NoWallet(String),

    /// RPC connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Timeout talking to the node or waiting for inclusion.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Node reported an internal JSON-RPC error.
    #[error("internal JSON-RPC error: {0}")]
    RpcInternal(String),

    /// Node rejected the transaction as underpriced.
    #[error("transaction underpriced: {0}")]
    Underpriced(String),

    /// Sender cannot pay for value plus gas.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Nonce conflict.
    #[error("nonce error: {0}")]
    Nonce(String),

    /// Transaction mined but reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// Any other JSON-RPC error.
    #[error("rpc error{}: {message}", fmt_code(.code))]
    Rpc {
        /// JSON-RPC error code, if one was returned.
        code: Option<i64>,
        /// Error message.
        message: String,
    },

    /// Chain served by the endpoint differs from the configured one.
    #[error("unsupported chain: expected {expected}, got {actual}")]
    UnsupportedChain {
        /// Configured chain.
        expected: ChainId,
        /// Chain reported by the node.
        actual: ChainId,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BlockchainError {
    /// Creates a no-wallet error.
    #[must_use]
    pub fn no_wallet(msg: impl Into<String>) -> Self {
        Self::NoWallet(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a reverted error.
    #[must_use]
    pub fn reverted(msg: impl Into<String>) -> Self {
        Self::Reverted(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classifies a JSON-RPC error response.
    ///
    /// # Examples
    ///
    /// ```
    /// use testnet_autosender::infrastructure::blockchain::BlockchainError;
    ///
    /// let err = BlockchainError::from_rpc(Some(-32000), "transaction underpriced");
    /// assert!(err.is_transient());
    ///
    /// let err = BlockchainError::from_rpc(Some(-32000), "execution reverted");
    /// assert!(!err.is_transient());
    /// ```
    #[must_use]
    pub fn from_rpc(code: Option<i64>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if code == Some(RPC_INTERNAL_ERROR_CODE) || lower.contains("internal json-rpc error") {
            Self::RpcInternal(message)
        } else if lower.contains("underpriced") {
            Self::Underpriced(message)
        } else if lower.contains("insufficient funds") {
            Self::InsufficientFunds(message)
        } else if lower.contains("nonce too low") || lower.contains("already known") {
            Self::Nonce(message)
        } else {
            Self::Rpc { code, message }
        }
    }

    /// Returns true if the operation may succeed when retried after a delay.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RpcInternal(_) | Self::Underpriced(_))
    }
}

fn fmt_code(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Trait for blockchain client operations.
#[async_trait]
pub trait BlockchainClient: Send + Sync + fmt::Debug {
    /// Returns the chain ID this client is configured for.
    fn chain_id(&self) -> ChainId;

    /// Returns the accounts the wallet can sign for.
    ///
    /// # Errors
    ///
    /// Returns [`BlockchainError::NoWallet`] if no wallet is available.
    async fn accounts(&self) -> BlockchainResult<Vec<Address>>;

    /// Returns the chain ID reported by the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_chain_id(&self) -> BlockchainResult<ChainId>;

    /// Returns the balance of an address in base units.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_balance(&self, address: Address) -> BlockchainResult<u128>;

    /// Returns the transaction count (nonce) for an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Returns the current gas price.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn get_gas_price(&self) -> BlockchainResult<GasPrice>;

    /// Estimates the gas limit for a transfer, without any buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if gas estimation fails.
    async fn estimate_gas(&self, request: &TransferRequest) -> BlockchainResult<u64>;

    /// Signs and submits a transfer, returning its hash once the node accepts it.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or submission fails.
    async fn send_transaction(&self, request: &TransferRequest) -> BlockchainResult<TxHash>;

    /// Waits until the transaction is mined and returns its receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is dropped or reverts.
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> BlockchainResult<TxReceipt>;

    /// Registers the target network with the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet refuses the network.
    async fn add_network(&self, params: &AddChainParams) -> BlockchainResult<()>;
}

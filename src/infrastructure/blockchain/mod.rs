//! # Blockchain Clients
//!
//! Access to the target EVM network.
//!
//! ## Available Components
//!
//! - [`BlockchainClient`]: Trait for blockchain interactions
//! - [`EthereumClient`]: ethers-rs implementation with a local signing wallet
//! - [`GasPrice`]: Legacy gas price
//! - [`GasEstimator`]: Gas-limit estimation with buffer
//! - [`AddChainParams`]: Network description handed to the wallet

pub mod client;
pub mod ethereum;
pub mod gas;
pub mod network;

pub use client::{
    BlockchainClient, BlockchainError, BlockchainResult, TransferRequest, TxReceipt,
};
pub use ethereum::EthereumClient;
pub use gas::{GasEstimator, GasPrice};
pub use network::{AddChainParams, NativeCurrency};

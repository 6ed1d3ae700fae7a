//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! AppError
//! ├── Blockchain(BlockchainError)  - Node, wallet, and transaction failures
//! ├── Faucet(FaucetError)          - Faucet request failures
//! ├── InvalidAddress(AddressError) - Malformed receiver (input error)
//! ├── Amount(AmountError)          - Unrepresentable amounts
//! ├── RetriesExhausted             - Transient failures past the retry bound
//! └── ... (session and lifecycle variants)
//! ```
//!
//! # Examples
//!
//! ```
//! use testnet_autosender::application::error::AppError;
//! use testnet_autosender::infrastructure::blockchain::BlockchainError;
//!
//! let err: AppError = BlockchainError::from_rpc(Some(-32603), "boom").into();
//! assert!(err.is_transient());
//! assert!(!AppError::NotConnected.is_transient());
//! ```

use crate::domain::value_objects::{AddressError, AmountError};
use crate::infrastructure::blockchain::BlockchainError;
use crate::infrastructure::faucet::FaucetError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Blockchain client error.
    #[error("{0}")]
    Blockchain(#[from] BlockchainError),

    /// Faucet error.
    #[error("{0}")]
    Faucet(#[from] FaucetError),

    /// Receiver address failed validation.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Amount could not be represented.
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),

    /// No wallet account is connected.
    #[error("wallet not connected")]
    NotConnected,

    /// No receiver address is set.
    #[error("receiver address not set")]
    MissingReceiver,

    /// Start requested while the loop is already running.
    #[error("automation already running")]
    AlreadyRunning,

    /// Manual operation requested while the loop is running.
    #[error("operation unavailable while automation is running")]
    AutomationRunning,

    /// A transient failure persisted through every retry.
    #[error("{last} (gave up after {attempts} attempts)")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Last failure.
        last: Box<AppError>,
    },

    /// The automation loop was stopped before a pending retry.
    #[error("automation stopped")]
    Stopped,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error is a transient RPC condition worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Blockchain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Returns true if this error was caused by user input.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_) | Self::MissingReceiver | Self::NotConnected
        )
    }

    /// Returns the underlying failure, looking through exhausted retries.
    #[must_use]
    pub fn root_cause(&self) -> &AppError {
        match self {
            Self::RetriesExhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }

    /// Returns true if no wallet provider is available.
    #[must_use]
    pub fn is_no_wallet(&self) -> bool {
        matches!(self, Self::Blockchain(BlockchainError::NoWallet(_)))
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_only_for_classified_rpc_errors() {
        let err = AppError::from(BlockchainError::from_rpc(None, "transaction underpriced"));
        assert!(err.is_transient());

        let err = AppError::from(FaucetError::timeout("slow"));
        assert!(!err.is_transient());
    }

    #[test]
    fn input_errors() {
        assert!(AppError::from(AddressError::Empty).is_input_error());
        assert!(AppError::MissingReceiver.is_input_error());
        assert!(!AppError::Stopped.is_input_error());
    }

    #[test]
    fn exhausted_display_keeps_cause() {
        let err = AppError::RetriesExhausted {
            attempts: 4,
            last: Box::new(FaucetError::rejected(500, "down").into()),
        };
        assert_eq!(
            err.to_string(),
            "failed to retrieve from faucet: down (gave up after 4 attempts)"
        );
        assert_eq!(
            err.root_cause().to_string(),
            "failed to retrieve from faucet: down"
        );
    }

    #[test]
    fn no_wallet_detection() {
        let err = AppError::from(BlockchainError::no_wallet("missing key"));
        assert!(err.is_no_wallet());
    }
}

//! # Faucet Errors
//!
//! Error types for faucet requests.
//!
//! # Examples
//!
//! ```
//! use testnet_autosender::infrastructure::faucet::FaucetError;
//!
//! let error = FaucetError::rejected(429, "Too many requests");
//! assert_eq!(error.status(), Some(429));
//! assert_eq!(
//!     error.to_string(),
//!     "failed to retrieve from faucet: Too many requests"
//! );
//! ```

use thiserror::Error;

/// Message used when the faucet gives no reason for a failure.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Error type for faucet operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaucetError {
    /// Request timed out.
    #[error("faucet timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("faucet connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The faucet answered with a non-success status.
    #[error("failed to retrieve from faucet: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the faucet.
        message: String,
    },

    /// Client construction or request encoding failed.
    #[error("faucet internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl FaucetError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a rejection error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status, for rejections.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for faucet operations.
pub type FaucetResult<T> = Result<T, FaucetError>;

//! # Faucet Port
//!
//! Trait implemented by faucet backends.

use super::error::FaucetResult;
use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Successful faucet answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaucetGrant {
    /// HTTP status returned by the faucet.
    pub status: u16,
    /// Optional message from the faucet.
    pub message: Option<String>,
}

/// A remote service granting test currency.
#[async_trait]
pub trait FaucetApi: Send + Sync + fmt::Debug {
    /// Endpoint the requests go to.
    fn endpoint(&self) -> &str;

    /// Asks the faucet to fund `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`FaucetError`](super::FaucetError) if the request fails or
    /// the faucet answers with a non-success status.
    async fn request_funds(&self, address: Address) -> FaucetResult<FaucetGrant>;
}

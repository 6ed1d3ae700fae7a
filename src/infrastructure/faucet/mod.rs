//! # Faucet Client
//!
//! - [`FaucetApi`]: Port for faucet backends
//! - [`HttpFaucetClient`]: JSON-over-HTTP faucet client
//! - [`FaucetError`]: Faucet failures

pub mod error;
pub mod http_client;
pub mod traits;

pub use error::{FaucetError, FaucetResult};
pub use http_client::HttpFaucetClient;
pub use traits::{FaucetApi, FaucetGrant};

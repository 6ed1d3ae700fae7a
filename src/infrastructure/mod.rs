//! # Infrastructure Layer
//!
//! Adapters for the outside world: the EVM node and the faucet service.

pub mod blockchain;
pub mod faucet;

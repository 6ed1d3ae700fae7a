//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`NativeAmount`]: Decimal amount of native currency with base-unit conversion
//! - [`ChainId`]: EIP-155 chain identifier
//! - [`TxHash`]: Transaction hash
//! - [`parse_address`]: Validation of user-supplied addresses

pub mod address;
pub mod amount;
pub mod chain;
pub mod tx_hash;

pub use address::{format_address, is_valid_address, parse_address, AddressError};
pub use amount::{AmountError, AmountResult, NativeAmount};
pub use chain::ChainId;
pub use tx_hash::TxHash;

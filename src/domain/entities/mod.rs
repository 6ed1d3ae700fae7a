//! # Domain Entities
//!
//! - [`Session`]: Connected account and cached balance
//! - [`TransferIntent`]: One transfer about to be attempted
//! - [`TransactionResult`]: Last completed transfer
//! - [`AutomationState`]: Loop pacing state

pub mod automation;
pub mod session;
pub mod transfer;

pub use automation::{AutomationState, AutomationStatus};
pub use session::Session;
pub use transfer::{TransactionResult, TransferIntent};

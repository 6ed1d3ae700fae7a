//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`FaucetService`]: Threshold-gated faucet top-ups with retry
//! - [`TransactionDispatcher`]: Fixed-amount transfers with retry on transient errors
//! - [`AutomationLoop`]: Paced faucet and transfer loop
//! - [`BalanceMonitor`]: Periodic balance refresh
//! - [`RetryPolicy`]: Bounded fixed-delay retries
//! - [`Clock`]: Time source, replaceable in tests

pub mod automation;
pub mod balance_monitor;
pub mod clock;
pub mod dispatcher;
pub mod faucet;
pub mod retry;
pub mod run_flag;

pub use automation::{AutomationConfig, AutomationLoop};
pub use balance_monitor::BalanceMonitor;
pub use clock::{Clock, TokioClock};
pub use dispatcher::{DispatchConfig, DispatchOutcome, TransactionDispatcher};
pub use faucet::{FaucetConfig, FaucetOutcome, FaucetService};
pub use retry::{RetryError, RetryPolicy};
pub use run_flag::RunFlag;

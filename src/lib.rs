//! # Testnet Autosender
//!
//! Keeps a test-network account funded from a faucet and sends small
//! native-currency transfers from it to a chosen receiver on a fixed pace.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  presentation (bin/autosender, or your own)  │
//! └──────────────────────┬───────────────────────┘
//!                        │ intents / snapshots / notifications
//! ┌──────────────────────▼───────────────────────┐
//! │  application                                  │
//! │  AutosenderApp ─► AutomationLoop              │
//! │                    ├─► FaucetService          │
//! │                    └─► TransactionDispatcher  │
//! │  BalanceMonitor, RetryPolicy, Clock           │
//! └──────────────────────┬───────────────────────┘
//!                        │ ports
//! ┌──────────────────────▼───────────────────────┐
//! │  infrastructure                               │
//! │  BlockchainClient (ethers)   FaucetApi (HTTP) │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The domain layer holds the value types shared by all of the above.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use testnet_autosender::application::{AutosenderApp, TracingNotifier};
//! use testnet_autosender::config::Settings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(None)?;
//! let app = AutosenderApp::from_settings(&settings, Arc::new(TracingNotifier))?;
//! app.connect().await?;
//! app.set_receiver("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//! app.start()?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

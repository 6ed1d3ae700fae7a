//! # Faucet Service
//!
//! Tops up the connected account from the faucet.
//!
//! Every attempt first reads the live balance; at or above the threshold the
//! request is skipped, which is not an error. Any other failure is retried
//! under the service's [`RetryPolicy`]. After a grant the session balance is
//! refreshed exactly once.

use super::clock::Clock;
use super::retry::RetryPolicy;
use super::run_flag::RunFlag;
use crate::application::error::{AppError, AppResult};
use crate::application::notifications::{Notification, Notifier};
use crate::application::session::BalanceRefresher;
use crate::domain::value_objects::NativeAmount;
use crate::infrastructure::blockchain::BlockchainClient;
use crate::infrastructure::faucet::{FaucetApi, FaucetGrant};
use ethers::types::Address;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for the faucet service.
#[derive(Debug, Clone)]
pub struct FaucetConfig {
    /// Balance at or above which no request is made.
    pub threshold: NativeAmount,
    /// Native currency decimals.
    pub decimals: u32,
    /// Native currency symbol, for messages.
    pub symbol: String,
    /// Retry policy for failed requests.
    pub retry: RetryPolicy,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            threshold: NativeAmount::ONE,
            decimals: 18,
            symbol: "ONE".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// How a faucet request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetOutcome {
    /// The faucet granted funds.
    Granted(FaucetGrant),
    /// The balance was already at or above the threshold.
    Skipped {
        /// Balance observed.
        balance: NativeAmount,
    },
}

/// Requests test currency for the connected account.
#[derive(Debug, Clone)]
pub struct FaucetService {
    faucet: Arc<dyn FaucetApi>,
    client: Arc<dyn BlockchainClient>,
    refresher: Arc<dyn BalanceRefresher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: FaucetConfig,
}

impl FaucetService {
    /// Creates a new faucet service.
    #[must_use]
    pub fn new(
        faucet: Arc<dyn FaucetApi>,
        client: Arc<dyn BlockchainClient>,
        refresher: Arc<dyn BalanceRefresher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: FaucetConfig,
    ) -> Self {
        Self {
            faucet,
            client,
            refresher,
            notifier,
            clock,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }

    /// Requests funds for `account`.
    ///
    /// `run_flag` is the automation loop's flag when the loop is the caller;
    /// clearing it abandons pending retries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RetriesExhausted`] once every attempt failed, or
    /// [`AppError::Stopped`] if the loop stopped while a retry was pending.
    pub async fn request(
        &self,
        account: Address,
        run_flag: Option<&RunFlag>,
    ) -> AppResult<FaucetOutcome> {
        info!(?account, endpoint = self.faucet.endpoint(), "requesting faucet funds");

        let result = self
            .config
            .retry
            .run(
                self.clock.as_ref(),
                run_flag,
                |_: &AppError| true,
                |err, left| {
                    warn!(error = %err, retries_left = left, "faucet request failed");
                    self.notifier.notify(Notification::warning(format!(
                        "Retrying faucet request. Attempts left: {}",
                        left
                    )));
                },
                |_| self.attempt(account),
            )
            .await
            .map_err(AppError::from);

        match result {
            Ok(FaucetOutcome::Skipped { balance }) => {
                info!(balance = %balance, threshold = %self.config.threshold, "faucet skipped");
                self.notifier.notify(Notification::warning(format!(
                    "Balance exceeds {} {}, not requesting faucet.",
                    self.config.threshold, self.config.symbol
                )));
                Ok(FaucetOutcome::Skipped { balance })
            }
            Ok(FaucetOutcome::Granted(grant)) => {
                info!(status = grant.status, "faucet granted funds");
                self.notifier
                    .notify(Notification::success("Successfully retrieved tokens from faucet"));
                if let Err(e) = self.refresher.refresh(account).await {
                    warn!(error = %e, "balance refresh after faucet grant failed");
                }
                Ok(FaucetOutcome::Granted(grant))
            }
            Err(AppError::Stopped) => {
                info!("faucet retry abandoned, automation stopped");
                Err(AppError::Stopped)
            }
            Err(err) => {
                self.notifier.notify(Notification::error(format!(
                    "Faucet error: {}",
                    err.root_cause()
                )));
                Err(err)
            }
        }
    }

    async fn attempt(&self, account: Address) -> AppResult<FaucetOutcome> {
        let units = self.client.get_balance(account).await?;
        let balance = NativeAmount::from_base_units(units, self.config.decimals)?;
        if balance >= self.config.threshold {
            return Ok(FaucetOutcome::Skipped { balance });
        }
        let grant = self.faucet.request_funds(account).await?;
        Ok(FaucetOutcome::Granted(grant))
    }
}

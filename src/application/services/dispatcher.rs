//! # Transaction Dispatcher
//!
//! Sends the fixed-amount transfer from the connected account.
//!
//! # Attempt Pipeline
//!
//! ```text
//! validate receiver ─► balance ─► nonce ─► gas price ─► estimate (+buffer)
//!                         │                                   │
//!                  short: Deferred                     send ─► receipt
//! ```
//!
//! The receiver is validated once, before any network call. Each attempt
//! re-reads the balance, so a retry after a top-up sees the new funds. Only
//! transient RPC failures are retried.

use super::clock::Clock;
use super::retry::RetryPolicy;
use super::run_flag::RunFlag;
use crate::application::error::{AppError, AppResult};
use crate::application::notifications::{Notification, Notifier};
use crate::application::session::BalanceRefresher;
use crate::domain::entities::{TransactionResult, TransferIntent};
use crate::domain::value_objects::{parse_address, NativeAmount};
use crate::infrastructure::blockchain::{BlockchainClient, GasEstimator, TransferRequest};
use ethers::types::Address;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Amount sent per transfer.
    pub amount: NativeAmount,
    /// Native currency decimals.
    pub decimals: u32,
    /// Native currency symbol, for logs.
    pub symbol: String,
    /// Gas-limit buffer.
    pub gas: GasEstimator,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl DispatchConfig {
    /// Amount sent per transfer unless configured otherwise (0.15).
    pub const DEFAULT_AMOUNT: NativeAmount = NativeAmount::from_scaled(15, 2);
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            amount: Self::DEFAULT_AMOUNT,
            decimals: 18,
            symbol: "ONE".to_string(),
            gas: GasEstimator::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transfer was mined.
    Sent(TransactionResult),
    /// The balance did not cover the amount; nothing was sent.
    Deferred {
        /// Balance observed.
        balance: NativeAmount,
    },
}

/// Builds, submits, and confirms transfers.
#[derive(Debug)]
pub struct TransactionDispatcher {
    client: Arc<dyn BlockchainClient>,
    refresher: Arc<dyn BalanceRefresher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: DispatchConfig,
    last_result: RwLock<Option<TransactionResult>>,
}

impl TransactionDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(
        client: Arc<dyn BlockchainClient>,
        refresher: Arc<dyn BalanceRefresher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            client,
            refresher,
            notifier,
            clock,
            config,
            last_result: RwLock::new(None),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the most recently completed transfer.
    #[must_use]
    pub fn last_result(&self) -> Option<TransactionResult> {
        self.last_result.read().clone()
    }

    /// Sends one transfer from `account` to `receiver`.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidAddress`] if `receiver` is malformed
    /// - [`AppError::RetriesExhausted`] if a transient failure persisted
    /// - [`AppError::Stopped`] if the loop stopped while a retry was pending
    /// - any other classified failure, without retry
    pub async fn dispatch(
        &self,
        account: Address,
        receiver: &str,
        run_flag: Option<&RunFlag>,
    ) -> AppResult<DispatchOutcome> {
        let to = match parse_address(receiver) {
            Ok(to) => to,
            Err(e) => {
                warn!(receiver, error = %e, "rejecting receiver");
                self.notifier
                    .notify(Notification::error("Please enter a valid EVM address"));
                return Err(e.into());
            }
        };
        let intent = TransferIntent::new(
            account,
            to,
            self.config.amount,
            self.config.decimals,
            self.client.chain_id(),
        )?;

        let result = self
            .config
            .retry
            .run(
                self.clock.as_ref(),
                run_flag,
                AppError::is_transient,
                |err, left| {
                    warn!(error = %err, retries_left = left, "transient transaction failure");
                    self.notifier.notify(Notification::warning(format!(
                        "Retrying transaction. Attempts left: {}",
                        left
                    )));
                },
                |_| self.attempt(&intent),
            )
            .await
            .map_err(AppError::from);

        match result {
            Ok(DispatchOutcome::Deferred { balance }) => {
                info!(balance = %balance, amount = %intent.amount(), "insufficient funds, deferring");
                self.notifier.notify(Notification::warning(
                    "Insufficient funds, waiting for next faucet cycle",
                ));
                Ok(DispatchOutcome::Deferred { balance })
            }
            Ok(DispatchOutcome::Sent(tx)) => {
                *self.last_result.write() = Some(tx.clone());
                if let Err(e) = self.refresher.refresh(account).await {
                    warn!(error = %e, "balance refresh after transfer failed");
                }
                Ok(DispatchOutcome::Sent(tx))
            }
            Err(AppError::Stopped) => {
                info!("transaction retry abandoned, automation stopped");
                Err(AppError::Stopped)
            }
            Err(err) => {
                self.notifier.notify(Notification::error(format!(
                    "Transaction error: {}",
                    err.root_cause()
                )));
                Err(err)
            }
        }
    }

    async fn attempt(&self, intent: &TransferIntent) -> AppResult<DispatchOutcome> {
        let account = intent.sender();
        let balance_units = self.client.get_balance(account).await?;
        let balance = NativeAmount::from_base_units(balance_units, self.config.decimals)?;
        debug!(balance = %balance, symbol = %self.config.symbol, "account balance");
        if !intent.is_covered_by(balance_units) {
            return Ok(DispatchOutcome::Deferred { balance });
        }

        let nonce = self.client.get_nonce(account).await?;
        let gas_price = self.client.get_gas_price().await?;
        let request = TransferRequest::from_intent(intent)
            .with_nonce(nonce)
            .with_gas_price(gas_price);
        let estimate = self.client.estimate_gas(&request).await?;
        let gas_limit = self.config.gas.apply_buffer(estimate);
        debug!(
            nonce,
            gas_price = %gas_price,
            estimate,
            gas_limit,
            max_fee_wei = %self.config.gas.estimate_cost(gas_limit, gas_price),
            "transaction prepared"
        );

        let request = request.with_gas_limit(gas_limit);
        let tx_hash = self.client.send_transaction(&request).await?;
        info!(tx_hash = %tx_hash, to = ?intent.receiver(), amount = %intent.amount(), "transaction sent");
        self.notifier
            .notify(Notification::success(format!("Transaction sent! Hash: {}", tx_hash)));

        let receipt = self.client.wait_for_receipt(&tx_hash).await?;
        let price = receipt.effective_gas_price.unwrap_or(gas_price.wei());
        let result = TransactionResult::new(
            tx_hash,
            receipt.gas_used,
            price,
            self.config.decimals,
            receipt.block_number,
        )?;
        info!(
            tx_hash = %result.tx_hash,
            gas_used = result.gas_used,
            gas_cost = %result.gas_cost,
            "transaction confirmed"
        );
        Ok(DispatchOutcome::Sent(result))
    }
}

//! # Controller
//!
//! User intents for a presentation layer.
//!
//! [`AutosenderApp`] wires the services together and exposes the intents a
//! user can trigger: connect, add network, edit receiver, start, stop, send
//! once, and request faucet funds. State is read back through
//! [`AutosenderApp::snapshot`]; progress and failures are pushed through the
//! [`Notifier`].

use super::error::{AppError, AppResult};
use super::notifications::{Notification, Notifier};
use super::services::{
    AutomationLoop, BalanceMonitor, Clock, DispatchOutcome, FaucetOutcome, FaucetService,
    TokioClock, TransactionDispatcher,
};
use super::session::{BalanceRefresher, ChainBalanceRefresher, SessionStore};
use crate::config::Settings;
use crate::domain::entities::{AutomationStatus, TransactionResult};
use crate::domain::value_objects::{format_address, ChainId, NativeAmount};
use crate::infrastructure::blockchain::{AddChainParams, BlockchainClient, EthereumClient};
use crate::infrastructure::faucet::{FaucetApi, HttpFaucetClient};
use ethers::types::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Point-in-time view of the application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSnapshot {
    /// Connected account, checksummed.
    pub account: Option<String>,
    /// Cached balance.
    pub balance: Option<NativeAmount>,
    /// Currency symbol.
    pub symbol: String,
    /// Loop status.
    pub status: AutomationStatus,
    /// Receiver as entered.
    pub receiver: String,
    /// Last completed transfer.
    pub last_transaction: Option<TransactionResult>,
    /// Configured chain.
    pub chain_id: ChainId,
}

impl AppSnapshot {
    /// Balance with four decimals and the currency symbol, e.g. `0.5000 ONE`.
    #[must_use]
    pub fn balance_display(&self) -> Option<String> {
        self.balance
            .map(|b| format!("{} {}", b.display_rounded(), self.symbol))
    }
}

/// The autosender application.
#[derive(Debug)]
pub struct AutosenderApp {
    client: Arc<dyn BlockchainClient>,
    store: SessionStore,
    refresher: Arc<dyn BalanceRefresher>,
    notifier: Arc<dyn Notifier>,
    faucet: Arc<FaucetService>,
    dispatcher: Arc<TransactionDispatcher>,
    automation: AutomationLoop,
    monitor: BalanceMonitor,
    network: AddChainParams,
    symbol: String,
    receiver: RwLock<String>,
}

impl AutosenderApp {
    /// Assembles the application from its adapters.
    #[must_use]
    pub fn new(
        client: Arc<dyn BlockchainClient>,
        faucet_api: Arc<dyn FaucetApi>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
    ) -> Self {
        let store = SessionStore::new();
        let refresher: Arc<dyn BalanceRefresher> = Arc::new(ChainBalanceRefresher::new(
            Arc::clone(&client),
            store.clone(),
            settings.network.decimals,
        ));
        Self::with_refresher(client, faucet_api, notifier, clock, settings, store, refresher)
    }

    /// Assembles the application around an existing session store and refresher.
    #[must_use]
    pub fn with_refresher(
        client: Arc<dyn BlockchainClient>,
        faucet_api: Arc<dyn FaucetApi>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
        store: SessionStore,
        refresher: Arc<dyn BalanceRefresher>,
    ) -> Self {
        let faucet = Arc::new(FaucetService::new(
            faucet_api,
            Arc::clone(&client),
            Arc::clone(&refresher),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            settings.faucet_config(),
        ));
        let dispatcher = Arc::new(TransactionDispatcher::new(
            Arc::clone(&client),
            Arc::clone(&refresher),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            settings.dispatch_config(),
        ));
        let automation = AutomationLoop::new(
            Arc::clone(&faucet),
            Arc::clone(&dispatcher),
            clock,
            settings.automation_config(),
        );
        let monitor = BalanceMonitor::new(Arc::clone(&refresher), settings.balance_poll_interval());

        Self {
            client,
            store,
            refresher,
            notifier,
            faucet,
            dispatcher,
            automation,
            monitor,
            network: settings.add_chain_params(),
            symbol: settings.network.currency_symbol.clone(),
            receiver: RwLock::new(settings.receiver().unwrap_or_default().to_string()),
        }
    }

    /// Builds the application against the configured network and faucet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Blockchain`] with a no-wallet error if no signing
    /// key is configured, and other errors if a client cannot be built.
    pub fn from_settings(settings: &Settings, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let client = match EthereumClient::new(
            settings.chain_id(),
            &settings.network.rpc_url,
            settings.wallet.private_key.as_deref(),
        ) {
            Ok(client) => client.with_confirmations(settings.transfer.confirmations),
            Err(e) => {
                error!(error = %e, "wallet unavailable");
                notifier.notify(Notification::error(format!("No wallet available: {}", e)));
                return Err(e.into());
            }
        };
        let faucet = HttpFaucetClient::new(&settings.faucet.url, settings.faucet.timeout_ms)?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(faucet),
            notifier,
            Arc::new(TokioClock),
            settings,
        ))
    }

    /// Connects the wallet's first account and starts balance polling.
    ///
    /// A chain mismatch is reported as a warning, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet has no account or the node is unreachable.
    pub async fn connect(&self) -> AppResult<Address> {
        match self.try_connect().await {
            Ok(account) => Ok(account),
            Err(e) => {
                warn!(error = %e, "wallet connection failed");
                self.notifier.notify(Notification::error("Failed to connect"));
                Err(e)
            }
        }
    }

    async fn try_connect(&self) -> AppResult<Address> {
        let accounts = self.client.accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or(AppError::NotConnected)?;

        self.store.connect(account);
        info!(account = %format_address(&account), "wallet connected");
        self.notifier.notify(Notification::success(format!(
            "Connected to {}",
            format_address(&account)
        )));

        let remote = self.client.get_chain_id().await?;
        let expected = self.client.chain_id();
        if remote != expected {
            warn!(%remote, %expected, "connected to unexpected chain");
            self.notifier.notify(Notification::warning(format!(
                "Please switch to {} (Chain ID: {})",
                self.network.chain_name, expected
            )));
        }

        if let Err(e) = self.refresher.refresh(account).await {
            warn!(error = %e, "initial balance refresh failed");
        }
        self.monitor.start(account);
        Ok(account)
    }

    /// Stops everything and discards the session.
    pub fn disconnect(&self) {
        self.automation.stop();
        self.monitor.stop();
        self.store.clear();
        info!("wallet disconnected");
    }

    /// Registers the configured network with the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet rejects the network.
    pub async fn add_network(&self) -> AppResult<()> {
        match self.client.add_network(&self.network).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "{} added successfully!",
                    self.network.chain_name
                )));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "adding network failed");
                self.notifier.notify(Notification::error(format!(
                    "Failed to add {}",
                    self.network.chain_name
                )));
                Err(e.into())
            }
        }
    }

    /// Replaces the receiver used by later sends and runs.
    ///
    /// A running loop keeps the receiver it was started with.
    pub fn set_receiver(&self, receiver: impl Into<String>) {
        *self.receiver.write() = receiver.into().trim().to_string();
    }

    /// Current receiver as entered.
    #[must_use]
    pub fn receiver(&self) -> String {
        self.receiver.read().clone()
    }

    /// Starts the automation loop.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConnected`], [`AppError::MissingReceiver`], or
    /// [`AppError::AlreadyRunning`].
    pub fn start(&self) -> AppResult<()> {
        let receiver = self.receiver();
        self.automation
            .start(self.store.account(), &receiver)
            .inspect_err(|e| self.notify_input_error(e))
    }

    /// Stops the automation loop. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        self.automation.stop()
    }

    /// Waits for a stopped loop to finish its last step.
    pub async fn wait_for_automation(&self) {
        self.automation.join().await;
    }

    /// Sends one transfer to the current receiver.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AutomationRunning`] while the loop runs,
    /// [`AppError::NotConnected`] without an account, and dispatch errors.
    pub async fn send_once(&self) -> AppResult<DispatchOutcome> {
        if self.automation.status().is_running() {
            return Err(AppError::AutomationRunning);
        }
        let account = self.require_account()?;
        let receiver = self.receiver();
        self.dispatcher.dispatch(account, &receiver, None).await
    }

    /// Requests faucet funds once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConnected`] without an account and faucet errors.
    pub async fn request_faucet(&self) -> AppResult<FaucetOutcome> {
        let account = self.require_account()?;
        self.faucet.request(account, None).await
    }

    /// Re-reads the balance of the connected account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotConnected`] without an account and RPC errors.
    pub async fn refresh_balance(&self) -> AppResult<NativeAmount> {
        let account = self.require_account()?;
        self.refresher.refresh(account).await
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> AppSnapshot {
        let session = self.store.get();
        AppSnapshot {
            account: session.as_ref().map(|s| s.account_display()),
            balance: session.as_ref().map(|s| s.balance()),
            symbol: self.symbol.clone(),
            status: self.automation.status(),
            receiver: self.receiver(),
            last_transaction: self.dispatcher.last_result(),
            chain_id: self.client.chain_id(),
        }
    }

    fn require_account(&self) -> AppResult<Address> {
        self.store
            .account()
            .ok_or(AppError::NotConnected)
            .inspect_err(|e| self.notify_input_error(e))
    }

    fn notify_input_error(&self, err: &AppError) {
        let message = match err {
            AppError::NotConnected => "Please connect your wallet first",
            AppError::MissingReceiver => "Please enter an EVM address",
            AppError::AlreadyRunning => "Automation is already running",
            _ => return,
        };
        self.notifier.notify(Notification::error(message));
    }
}

//! # Automation Loop
//!
//! Interleaves faucet top-ups with paced transfers until stopped.
//!
//! # States
//!
//! ```text
//!            start (account + receiver)
//!   Stopped ───────────────────────────► Running
//!      ▲                                    │
//!      └──────────────── stop ──────────────┘
//! ```
//!
//! Each tick runs the faucet when its interval has elapsed, then one
//! dispatch, then sleeps for the transaction interval. Ticks never overlap.
//! Stopping clears the run's flag; the loop observes it at the tick boundary
//! or before the next retry and exits without further side effects. A stop
//! during the inter-tick sleep ends the sleep at once. Calls already in
//! flight are not interrupted.
//!
//! Every run owns its own flag. A run started while the previous one is
//! still finishing an in-flight call waits for it before its first tick.

use super::clock::Clock;
use super::dispatcher::TransactionDispatcher;
use super::faucet::FaucetService;
use super::run_flag::RunFlag;
use crate::application::error::{AppError, AppResult};
use crate::domain::entities::{AutomationState, AutomationStatus};
use ethers::types::Address;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomationConfig {
    /// Minimum time between faucet attempts.
    pub faucet_interval: Duration,
    /// Pause between ticks.
    pub tx_interval: Duration,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            faucet_interval: Duration::from_millis(310_000),
            tx_interval: Duration::from_millis(10_000),
        }
    }
}

/// The automation loop and its lifecycle.
#[derive(Debug)]
pub struct AutomationLoop {
    faucet: Arc<FaucetService>,
    dispatcher: Arc<TransactionDispatcher>,
    clock: Arc<dyn Clock>,
    config: AutomationConfig,
    run_flag: Mutex<RunFlag>,
    state: Arc<Mutex<AutomationState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutomationLoop {
    /// Creates a stopped loop.
    #[must_use]
    pub fn new(
        faucet: Arc<FaucetService>,
        dispatcher: Arc<TransactionDispatcher>,
        clock: Arc<dyn Clock>,
        config: AutomationConfig,
    ) -> Self {
        Self {
            faucet,
            dispatcher,
            clock,
            config,
            run_flag: Mutex::new(RunFlag::new()),
            state: Arc::new(Mutex::new(AutomationState::new())),
            task: Mutex::new(None),
        }
    }

    /// Returns the pacing configuration.
    #[must_use]
    pub fn config(&self) -> AutomationConfig {
        self.config
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> AutomationStatus {
        if self.run_flag.lock().is_running() {
            AutomationStatus::Running
        } else {
            AutomationStatus::Stopped
        }
    }

    /// Returns a copy of the pacing state.
    #[must_use]
    pub fn state(&self) -> AutomationState {
        self.state.lock().clone()
    }

    /// Starts the loop for `account`, sending to `receiver`.
    ///
    /// The receiver is fixed for the life of this run. Nothing is scheduled
    /// when a precondition fails.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotConnected`] without an account
    /// - [`AppError::MissingReceiver`] if `receiver` is blank
    /// - [`AppError::AlreadyRunning`] if a loop is running
    pub fn start(&self, account: Option<Address>, receiver: &str) -> AppResult<()> {
        let account = account.ok_or(AppError::NotConnected)?;
        let receiver = receiver.trim();
        if receiver.is_empty() {
            return Err(AppError::MissingReceiver);
        }

        let mut task = self.task.lock();
        let mut current = self.run_flag.lock();
        if current.is_running() {
            return Err(AppError::AlreadyRunning);
        }
        let run_flag = RunFlag::new();
        if !run_flag.try_start() {
            return Err(AppError::AlreadyRunning);
        }
        *current = run_flag.clone();

        let previous = task.take().filter(|handle| !handle.is_finished());
        if previous.is_some() {
            debug!("previous automation run still finishing");
        }

        let worker = Worker {
            faucet: Arc::clone(&self.faucet),
            dispatcher: Arc::clone(&self.dispatcher),
            clock: Arc::clone(&self.clock),
            config: self.config,
            run_flag,
            state: Arc::clone(&self.state),
            previous,
            account,
            receiver: receiver.to_string(),
        };
        info!(?account, receiver, "automation started");
        *task = Some(tokio::spawn(worker.run()));
        Ok(())
    }

    /// Requests the loop to stop. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        let run_flag = self.run_flag.lock();
        let was_running = run_flag.is_running();
        run_flag.stop();
        if was_running {
            info!("automation stop requested");
        }
        was_running
    }

    /// Waits until the current run, if any, has exited.
    pub async fn join(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "automation task ended abnormally");
            }
        }
    }
}

impl Drop for AutomationLoop {
    fn drop(&mut self) {
        self.run_flag.lock().stop();
    }
}

struct Worker {
    faucet: Arc<FaucetService>,
    dispatcher: Arc<TransactionDispatcher>,
    clock: Arc<dyn Clock>,
    config: AutomationConfig,
    run_flag: RunFlag,
    state: Arc<Mutex<AutomationState>>,
    previous: Option<JoinHandle<()>>,
    account: Address,
    receiver: String,
}

impl Worker {
    async fn run(mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = previous.await {
                warn!(error = %e, "previous automation task ended abnormally");
            }
        }
        *self.state.lock() = AutomationState::new();

        let flag = Some(&self.run_flag);
        while self.run_flag.is_running() {
            let now = self.clock.now();
            let faucet_due = self
                .state
                .lock()
                .faucet_due(now, self.config.faucet_interval);

            if faucet_due {
                if let Err(e) = self.faucet.request(self.account, flag).await {
                    debug!(error = %e, "faucet step failed");
                }
                self.state.lock().record_faucet_attempt(now);
                if !self.run_flag.is_running() {
                    break;
                }
            }

            if let Err(e) = self
                .dispatcher
                .dispatch(self.account, &self.receiver, flag)
                .await
            {
                debug!(error = %e, "dispatch step failed");
            }

            let ticks = {
                let mut state = self.state.lock();
                state.record_tick();
                state.ticks()
            };
            debug!(ticks, "automation tick complete");
            tokio::select! {
                () = self.clock.sleep(self.config.tx_interval) => {}
                () = self.run_flag.stopped() => {}
            }
        }
        info!("automation loop exited");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::clock::TokioClock;
    use crate::application::services::dispatcher::DispatchConfig;
    use crate::application::services::faucet::FaucetConfig;
    use crate::application::session::SessionStore;
    use crate::application::testing::{
        CountingRefresher, EventLog, MockChain, MockFaucet, RecordingNotifier, RECEIVER,
    };
    use tokio::time::Instant;

    struct Fixture {
        automation: AutomationLoop,
        chain: Arc<MockChain>,
        log: EventLog,
    }

    fn fixture(balance: &str, faucet: impl FnOnce(EventLog) -> MockFaucet) -> Fixture {
        let log = EventLog::default();
        build(
            MockChain::with_balance(balance).with_log(log.clone()),
            faucet(log.clone()),
            log,
        )
    }

    fn fixture_with_chain(chain: MockChain, log: EventLog) -> Fixture {
        build(chain, MockFaucet::new(log.clone()), log)
    }

    fn build(chain: MockChain, faucet: MockFaucet, log: EventLog) -> Fixture {
        let chain = Arc::new(chain);
        let store = SessionStore::new();
        store.connect(chain.account());
        let refresher = Arc::new(CountingRefresher::new(chain.clone(), store));
        let notifier = Arc::new(RecordingNotifier::default());
        let clock: Arc<dyn Clock> = Arc::new(TokioClock);

        let faucet = FaucetService::new(
            Arc::new(faucet),
            chain.clone(),
            refresher.clone(),
            notifier.clone(),
            clock.clone(),
            FaucetConfig::default(),
        );
        let dispatcher = TransactionDispatcher::new(
            chain.clone(),
            refresher,
            notifier,
            clock.clone(),
            DispatchConfig::default(),
        );
        Fixture {
            automation: AutomationLoop::new(
                Arc::new(faucet),
                Arc::new(dispatcher),
                clock,
                AutomationConfig::default(),
            ),
            chain,
            log,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_account() {
        let f = fixture("0.5", MockFaucet::new);
        let err = f.automation.start(None, RECEIVER).unwrap_err();

        assert_eq!(err, AppError::NotConnected);
        assert_eq!(f.automation.status(), AutomationStatus::Stopped);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(f.log.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_receiver() {
        let f = fixture("0.5", MockFaucet::new);
        let err = f
            .automation
            .start(Some(f.chain.account()), "  ")
            .unwrap_err();
        assert_eq!(err, AppError::MissingReceiver);
        assert_eq!(f.automation.status(), AutomationStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_runs_faucet_then_dispatch() {
        let f = fixture("0.5", MockFaucet::new);
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();
        assert_eq!(f.automation.status(), AutomationStatus::Running);

        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(f.log.count("faucet"), 1);
        assert_eq!(f.chain.sent().len(), 1);
        let events = f.log.events();
        let faucet = events.iter().position(|e| e == "faucet").unwrap();
        let send = events.iter().position(|e| e == "send_transaction").unwrap();
        assert!(faucet < send);
    }

    #[tokio::test(start_paused = true)]
    async fn faucet_paced_by_interval() {
        let f = fixture("0.5", MockFaucet::new);
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();

        // Ticks at 0, 10, ..., 300 s; the faucet is next due at 310 s.
        tokio::time::sleep(Duration::from_secs(305)).await;
        assert_eq!(f.log.count("faucet"), 1);
        assert_eq!(f.chain.sent().len(), 31);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(f.log.count("faucet"), 2);
        assert_eq!(f.automation.state().ticks(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_faucet_still_records_attempt() {
        let f = fixture("0", MockFaucet::always_failing);
        let start = Instant::now();
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(f.log.count("faucet"), 4);
        assert_eq!(f.automation.state().last_faucet_at(), Some(start));
        assert!(f.chain.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_scheduled_tick() {
        let f = fixture("0.5", MockFaucet::new);
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let before = f.log.events().len();
        assert!(f.automation.stop());
        assert_eq!(f.automation.status(), AutomationStatus::Stopped);

        tokio::time::sleep(Duration::from_secs(600)).await;
        f.automation.join().await;
        assert_eq!(f.log.events().len(), before);
        assert_eq!(f.chain.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected() {
        let f = fixture("0.5", MockFaucet::new);
        tokio_test::assert_ok!(f.automation.start(Some(f.chain.account()), RECEIVER));
        let err = tokio_test::assert_err!(f.automation.start(Some(f.chain.account()), RECEIVER));
        assert_eq!(err, AppError::AlreadyRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_right_after_stop() {
        let f = fixture("0.5", MockFaucet::new);
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(f.automation.stop());
        tokio_test::assert_ok!(f.automation.start(Some(f.chain.account()), RECEIVER));
        assert_eq!(f.automation.status(), AutomationStatus::Running);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(f.log.count("faucet"), 2);
        assert_eq!(f.chain.sent().len(), 2);
        assert_eq!(f.automation.state().ticks(), 1);

        // Only the new run keeps ticking.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(f.chain.sent().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_waits_for_inflight_tick() {
        let log = EventLog::default();
        let f = fixture_with_chain(
            MockChain::with_balance("0.5")
                .with_log(log.clone())
                .with_receipt_delay(Duration::from_secs(3)),
            log,
        );
        f.automation.start(Some(f.chain.account()), RECEIVER).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        f.automation.stop();
        tokio_test::assert_ok!(f.automation.start(Some(f.chain.account()), RECEIVER));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(f.chain.sent().len(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let events = f.log.events();
        let sends: Vec<_> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == "send_transaction")
            .map(|(i, _)| i)
            .collect();
        let mined: Vec<_> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == "receipt_mined")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(sends.len(), 2);
        assert!(mined.first().unwrap() < sends.get(1).unwrap());
        assert_eq!(f.log.count("faucet"), 2);
    }
}

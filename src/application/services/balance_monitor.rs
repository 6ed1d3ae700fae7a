//! # Balance Monitor
//!
//! Periodic balance refresh for the connected account.
//!
//! The monitor owns a single background task. Starting it again replaces the
//! previous task, and dropping the monitor aborts it.

use crate::application::session::BalanceRefresher;
use ethers::types::Address;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Owned periodic balance refresh task.
#[derive(Debug)]
pub struct BalanceMonitor {
    refresher: Arc<dyn BalanceRefresher>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BalanceMonitor {
    /// Creates a stopped monitor.
    #[must_use]
    pub fn new(refresher: Arc<dyn BalanceRefresher>, interval: Duration) -> Self {
        Self {
            refresher,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts refreshing `account` every interval, replacing any running task.
    ///
    /// The first refresh happens one interval from now.
    pub fn start(&self, account: Address) {
        let refresher = Arc::clone(&self.refresher);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = refresher.refresh(account).await {
                    warn!(?account, error = %e, "periodic balance refresh failed");
                }
            }
        });

        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        debug!(?account, interval_ms = period.as_millis() as u64, "balance monitor started");
    }

    /// Stops the background task, if any.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            debug!("balance monitor stopped");
        }
    }

    /// Returns true while a refresh task is scheduled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for BalanceMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::session::SessionStore;
    use crate::application::testing::{CountingRefresher, EventLog, MockChain};

    fn monitor() -> (BalanceMonitor, Arc<MockChain>, SessionStore, EventLog) {
        let log = EventLog::default();
        let chain = Arc::new(MockChain::with_balance("0.3").with_log(log.clone()));
        let store = SessionStore::new();
        store.connect(chain.account());
        let refresher = Arc::new(CountingRefresher::new(chain.clone(), store.clone()));
        (
            BalanceMonitor::new(refresher, Duration::from_secs(10)),
            chain,
            store,
            log,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_every_interval() {
        let (monitor, chain, store, log) = monitor();
        monitor.start(chain.account());
        assert!(monitor.is_active());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(log.count("refresh"), 0);

        tokio::time::sleep(Duration::from_secs(26)).await;
        assert_eq!(log.count("refresh"), 3);
        assert_eq!(store.balance(), Some("0.3".parse().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_refreshes() {
        let (monitor, chain, _store, log) = monitor();
        monitor.start(chain.account());
        tokio::time::sleep(Duration::from_secs(11)).await;
        monitor.stop();
        assert!(!monitor.is_active());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(log.count("refresh"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_task() {
        let (monitor, chain, _store, log) = monitor();
        monitor.start(chain.account());
        monitor.start(chain.account());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(log.count("refresh"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_task() {
        let (monitor, chain, _store, log) = monitor();
        monitor.start(chain.account());
        drop(monitor);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(log.count("refresh"), 0);
    }
}

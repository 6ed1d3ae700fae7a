//! # Run Flag
//!
//! The shared "running" bit of the automation loop.
//!
//! The loop checks it at every tick boundary and before every retry; the
//! presentation layer only reads it. Clearing it never interrupts a call
//! already in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    running: AtomicBool,
    stopped: Notify,
}

/// Cooperative stop flag.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<Inner>);

impl RunFlag {
    /// Creates a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag; returns false if it was already set.
    pub fn try_start(&self) -> bool {
        self.0
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clears the flag and wakes every [`RunFlag::stopped`] waiter.
    pub fn stop(&self) {
        self.0.running.store(false, Ordering::Release);
        self.0.stopped.notify_waiters();
    }

    /// Returns true while set.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.running.load(Ordering::Acquire)
    }

    /// Resolves once the flag is cleared.
    pub async fn stopped(&self) {
        loop {
            let notified = self.0.stopped.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

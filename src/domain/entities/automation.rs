//! # Automation State
//!
//! Pacing state owned by the automation loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Whether the automation loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationStatus {
    /// Initial state; no ticks are scheduled.
    #[default]
    Stopped,
    /// Ticks are being scheduled.
    Running,
}

impl AutomationStatus {
    /// Returns true when running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Loop-local pacing state.
///
/// Starts with no recorded faucet attempt, so the first tick always
/// requests from the faucet.
#[derive(Debug, Clone, Default)]
pub struct AutomationState {
    last_faucet_at: Option<Instant>,
    ticks: u64,
}

impl AutomationState {
    /// Creates a fresh state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a faucet attempt is due at `now`.
    #[must_use]
    pub fn faucet_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_faucet_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Records a faucet attempt regardless of its outcome.
    pub fn record_faucet_attempt(&mut self, at: Instant) {
        self.last_faucet_at = Some(at);
    }

    /// Time of the last faucet attempt.
    #[must_use]
    pub fn last_faucet_at(&self) -> Option<Instant> {
        self.last_faucet_at
    }

    /// Counts a completed tick.
    pub fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

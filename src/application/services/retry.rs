//! # Retry Policy
//!
//! Bounded retries with a fixed delay between attempts.
//!
//! A policy with `max_retries = 3` makes at most four attempts. Errors the
//! caller does not consider retryable end the operation immediately. When a
//! [`RunFlag`] is supplied, a retry whose delay ends after the flag was
//! cleared is abandoned instead of attempted.

use super::clock::Clock;
use super::run_flag::RunFlag;
use crate::application::error::AppError;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Why a retried operation ended without success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A non-retryable error; no retry was attempted.
    Fatal(E),
    /// Every attempt failed with a retryable error.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Last error.
        last: E,
    },
    /// The run flag was cleared while waiting to retry.
    Cancelled,
}

impl From<RetryError<AppError>> for AppError {
    fn from(err: RetryError<AppError>) -> Self {
        match err {
            RetryError::Fatal(e) => e,
            RetryError::Exhausted { attempts, last } => AppError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
            RetryError::Cancelled => AppError::Stopped,
        }
    }
}

/// Bounded fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Default number of retries after the first attempt.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default delay between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it succeeds, fails fatally, or runs out of retries.
    ///
    /// `op` receives the zero-based attempt number. `on_retry` is called with
    /// the failure and the number of retries left after the upcoming one,
    /// before the delay starts.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] describing how the operation ended.
    pub async fn run<T, E, Op, Fut, Retryable, OnRetry>(
        &self,
        clock: &dyn Clock,
        run_flag: Option<&RunFlag>,
        is_retryable: Retryable,
        mut on_retry: OnRetry,
        mut op: Op,
    ) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Retryable: Fn(&E) -> bool,
        OnRetry: FnMut(&E, u32),
    {
        let mut attempt = 0u32;
        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retryable(&err) {
                return Err(RetryError::Fatal(err));
            }
            if attempt >= self.max_retries {
                return Err(RetryError::Exhausted {
                    attempts: attempt + 1,
                    last: err,
                });
            }

            let left = self.max_retries - attempt - 1;
            on_retry(&err, left);
            debug!(attempt, retries_left = left, error = %err, "retrying after delay");
            clock.sleep(self.delay).await;

            if run_flag.is_some_and(|flag| !flag.is_running()) {
                debug!("run flag cleared, abandoning retry");
                return Err(RetryError::Cancelled);
            }
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

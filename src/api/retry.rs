//! Per-call retry state with exponential backoff
//!
//! A fresh [`RetryState`] is created for every logical call, so nothing
//! carries over between calls. The backoff interval doubles on each throttling
//! retry and the wait for a retry is the larger of the backoff and the
//! store's suggested delay.

use std::time::Duration;

/// Attempt counter and current backoff interval for one logical call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    backoff: Duration,
}

impl RetryState {
    /// Start a call with the configured first backoff interval
    pub fn new(initial_backoff: Duration) -> Self {
        Self {
            attempt: 0,
            backoff: initial_backoff,
        }
    }

    /// Number of retries performed so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Backoff interval for the next retry
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Whether the retry budget is used up
    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.attempt >= max_retries
    }

    /// Wait before the next retry
    ///
    /// A suggested delay only matters when it exceeds the backoff.
    pub fn delay_for(&self, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(suggested) if suggested > self.backoff => suggested,
            _ => self.backoff,
        }
    }

    /// Record a retry: bump the attempt count and double the backoff
    pub fn advance(&mut self) {
        self.attempt += 1;
        self.backoff = self.backoff.saturating_mul(2);
    }
}

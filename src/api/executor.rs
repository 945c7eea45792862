//! Rate-limited request executor
//!
//! Wraps a [`Transport`] with two complementary policies:
//!
//! - **Reactive**: a rate-limit rejection is retried after
//!   `max(backoff, retry_after)`, with the backoff doubling each time, until
//!   `max_retries` is reached. The last rejection is then returned unchanged.
//! - **Proactive**: after a successful call, if the reported bucket is below
//!   the low-credit threshold, the executor waits long enough for it to refill
//!   to twice the threshold before handing the response back.
//!
//! Any other failure is returned immediately. Responses carrying
//! application-level errors are returned as-is for the caller to inspect.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{RetryConfig, ThrottleConfig};
use crate::error::SyncError;

use super::retry::RetryState;
use super::throttle::ThrottleStatus;
use super::transport::{CallOutcome, GraphqlRequest, GraphqlResponse, Transport};

/// Executes GraphQL requests with retry and pacing
pub struct RateLimitedExecutor<T> {
    transport: T,
    retry: RetryConfig,
    throttle: ThrottleConfig,
    last_status: Mutex<Option<ThrottleStatus>>,
}

impl<T: Transport> RateLimitedExecutor<T> {
    pub fn new(transport: T, retry: RetryConfig, throttle: ThrottleConfig) -> Self {
        Self {
            transport,
            retry,
            throttle,
            last_status: Mutex::new(None),
        }
    }

    /// Execute one logical call
    pub async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, SyncError> {
        let mut state = RetryState::new(self.retry.initial_backoff());

        loop {
            match self.transport.send(request).await {
                CallOutcome::Success(response) => {
                    self.pace(&response).await;
                    return Ok(response);
                }
                CallOutcome::RateLimited { retry_after } => {
                    if state.is_exhausted(self.retry.max_retries) {
                        warn!(
                            attempts = state.attempt() + 1,
                            max_retries = self.retry.max_retries,
                            "Max retries exhausted while rate limited"
                        );
                        return Err(SyncError::RateLimited { retry_after });
                    }

                    let delay = state.delay_for(retry_after);
                    info!(
                        attempt = state.attempt() + 1,
                        max_retries = self.retry.max_retries,
                        backoff_ms = state.backoff().as_millis() as u64,
                        retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
                        wait_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    state.advance();
                }
                CallOutcome::Failed(err) => {
                    debug!(error = %err, "Request failed without retry");
                    return Err(err);
                }
            }
        }
    }

    /// Throttle status reported by the most recent successful call
    pub async fn last_throttle_status(&self) -> Option<ThrottleStatus> {
        *self.last_status.lock().await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn pace(&self, response: &GraphqlResponse) {
        let status = response
            .extensions
            .as_ref()
            .and_then(ThrottleStatus::from_extensions);

        *self.last_status.lock().await = status;

        let Some(status) = status else {
            debug!("No cost envelope in response, skipping pacing");
            return;
        };

        debug!(
            requested_cost = status.requested_cost,
            actual_cost = status.actual_cost,
            available = status.available_credits,
            maximum = status.max_credits,
            restore_rate = status.restore_rate_per_second,
            "Query cost"
        );

        if let Some(wait) = status.pacing_delay(self.throttle.low_credit_threshold) {
            info!(
                available = status.available_credits,
                threshold = self.throttle.low_credit_threshold,
                wait_ms = wait.as_millis() as u64,
                "Credits running low, pausing before next call"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

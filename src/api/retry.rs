//! Bounded exponential-backoff retry gated by the rate limiter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::context::RequestContext;
use super::error::{ApiError, Result};
use super::ratelimit::RateLimiter;

/// Maximum number of retries after the first attempt.
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Ceiling for any single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Retry tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }
}

impl RetryConfig {
    /// Delay after the failed attempt `attempt` (0-based): `base * 2^attempt`,
    /// capped at `max_delay`. No jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Runs operations with rate limiting and retry.
///
/// The limiter is consulted before every attempt. A rejection is a hard stop
/// and is never retried, so a local quota problem never turns into more
/// traffic against the remote service.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    limiter: Arc<RateLimiter>,
    config: RetryConfig,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(Arc::new(RateLimiter::default()), RetryConfig::default())
    }
}

impl RetryExecutor {
    pub fn new(limiter: Arc<RateLimiter>, config: RetryConfig) -> Self {
        Self { limiter, config }
    }

    /// Run `op` up to `max_retries + 1` times.
    ///
    /// Returns the first success, the first non-retryable error, a
    /// cancellation error if `ctx` fires during a backoff wait, or the last
    /// error once attempts are exhausted.
    pub async fn execute_with_retry<T, F, Fut>(&self, ctx: &RequestContext, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if !self.limiter.allow() {
                warn!(
                    tokens_remaining = self.limiter.tokens_remaining(),
                    capacity = self.limiter.capacity(),
                    "Local rate limit reached, rejecting request"
                );
                return Err(ApiError::rate_limit("rate limit exceeded - local quota exhausted"));
            }

            debug!("Request attempt {}/{}", attempt + 1, self.config.max_retries + 1);

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    debug!("Non-retryable failure: {}", err);
                    return Err(err);
                }
                Err(err) => err,
            };

            if attempt < self.config.max_retries {
                let delay = self.config.backoff_delay(attempt);
                warn!(
                    "Request failed (attempt {}), retrying in {}ms: {}",
                    attempt + 1,
                    delay.as_millis(),
                    err
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    reason = ctx.done() => {
                        debug!("Backoff aborted: {}", reason.message);
                        return Err(reason);
                    }
                }
            }
            last_error = Some(err);
        }

        Err(last_error.unwrap_or_else(|| ApiError::api("no attempts were made", 0)))
    }
}

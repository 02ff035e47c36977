//! Bounded retry with exponential backoff
//!
//! A `RetryPolicy` is a plain value; `retry_with_backoff` applies it to any
//! async operation. Sleeping goes through the `Sleeper` trait so callers (and
//! tests) decide how time passes.

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default maximum attempts for RPC calls
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry (ms)
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 2000;

/// Default backoff multiplier
pub const DEFAULT_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves as one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier,
        }
    }

    fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Suspends the current task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Every attempt failed; carries the error from the last one
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E> {
    pub operation: String,
    pub attempts: u32,
    pub last_error: E,
}

/// Execute an async operation, retrying failures according to `policy`
///
/// Attempt `k` (1-indexed) that fails sleeps `initial_delay * multiplier^(k-1)`
/// before attempt `k + 1`. The final failed attempt returns immediately.
pub async fn retry_with_backoff<T, E, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    operation: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    S: Sleeper + ?Sized,
{
    let max_attempts = policy.effective_attempts();
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = %operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        operation = %operation,
                        attempts = attempt,
                        error = %e,
                        "Max retries exceeded"
                    );
                    return Err(RetryExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        last_error: e,
                    });
                }

                warn!(
                    operation = %operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Call failed, retrying..."
                );
                sleeper.sleep(delay).await;
                delay = delay.saturating_mul(policy.multiplier);
                attempt += 1;
            }
        }
    }
}

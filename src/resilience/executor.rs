//! Resilient execution of a single outbound call.
//!
//! ```text
//! Attempting ──ok──────────────────────────────▶ Succeeded
//!     │
//!     └─err─▶ Terminal, or attempts exhausted ──▶ Failed
//!     └─err─▶ RetryWithBackoff ──▶ Backoff(2^n·base) ──▶ Attempting
//!     └─err─▶ RetryImmediately ───────────────────────▶ Attempting
//! ```

use std::future::Future;
use std::time::Duration;

use crate::resilience::retries::{AttemptTimeout, Disposition, RetryPolicy, Retryable};

/// Runs an operation under a [`RetryPolicy`].
///
/// Stateless across calls; clones are cheap and safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct ResilientCallExecutor {
    policy: RetryPolicy,
}

impl ResilientCallExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `operation` until it succeeds, fails terminally, or runs out of
    /// attempts. The closure receives the 0-based attempt number.
    ///
    /// The last failure is returned unchanged, so its variant is the label the
    /// caller sees.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + From<AttemptTimeout> + std::fmt::Display,
    {
        let mut attempt: u32 = 0;

        loop {
            let result = match self.policy.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation(attempt)).await {
                    Ok(result) => result,
                    Err(_) => Err(E::from(AttemptTimeout { after: limit })),
                },
                None => operation(attempt).await,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            "Outbound call succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let disposition = error.disposition();
            if !disposition.is_retryable() || attempt >= self.policy.max_retries {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = self.policy.max_attempts(),
                    retryable = disposition.is_retryable(),
                    error = %error,
                    "Outbound call failed"
                );
                return Err(error);
            }

            let delay = match disposition {
                Disposition::RetryWithBackoff => self.policy.backoff(attempt),
                _ => Duration::ZERO,
            };
            tracing::info!(
                attempt = attempt + 1,
                delay = ?delay,
                error = %error,
                "Retrying outbound call"
            );
            crate::observability::metrics::record_outbound_retry(disposition);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

//! Retry classification and policy.
//!
//! # Responsibilities
//! - Let each failure say whether, and how, it may be retried
//! - Hold the bounded retry policy for one kind of outbound call
//!
//! # Design Decisions
//! - Retryability and the final label are independent: a failure decides its
//!   disposition, the executor never relabels it
//! - Rate limits back off exponentially; transient transport failures retry
//!   straight away under the same bound
//! - The attempt counter lives in the executor call, never in the policy

use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::resilience::backoff::calculate_backoff;

/// What the executor should do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop and surface the failure.
    Terminal,
    /// Retry without waiting.
    RetryImmediately,
    /// Retry after an exponential backoff delay.
    RetryWithBackoff,
}

impl Disposition {
    pub fn is_retryable(self) -> bool {
        !matches!(self, Disposition::Terminal)
    }
}

/// Implemented by error types the executor can drive.
pub trait Retryable {
    fn disposition(&self) -> Disposition;
}

/// Marker produced when a single attempt overruns its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTimeout {
    pub after: Duration,
}

/// Bounded retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (`max_retries + 1` attempts in total).
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_ratio: f64,
    /// Deadline for each attempt. `None` leaves timing to the operation.
    pub attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.base_delay.as_millis() as u64,
            self.max_delay.as_millis() as u64,
            self.jitter_ratio,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Longest a call can take: every attempt runs into its deadline and every
    /// retry waits the full backoff, jitter included. `None` without a deadline.
    pub fn worst_case_duration(&self) -> Option<Duration> {
        let deadline = self.attempt_timeout?;
        let attempts = deadline.saturating_mul(self.max_attempts());
        let waits = (0..self.max_retries)
            .map(|retry| {
                let capped = self
                    .base_delay
                    .saturating_mul(2u32.saturating_pow(retry))
                    .min(self.max_delay);
                capped.mul_f64(1.0 + self.jitter_ratio.clamp(0.0, 1.0))
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        Some(attempts.saturating_add(waits))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter_ratio: 0.0,
            attempt_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl From<&SummarizerConfig> for RetryPolicy {
    fn from(config: &SummarizerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_ratio: config.jitter_ratio,
            attempt_timeout: Some(Duration::from_secs(config.timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&SummarizerConfig::default());
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.attempt_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_worst_case_duration() {
        let policy = RetryPolicy::from(&SummarizerConfig::default());
        // 3 × 30s deadlines + 1s + 2s of backoff
        assert_eq!(policy.worst_case_duration(), Some(Duration::from_secs(93)));

        let jittered = RetryPolicy {
            jitter_ratio: 0.5,
            ..policy.clone()
        };
        assert_eq!(jittered.worst_case_duration(), Some(Duration::from_millis(94_500)));

        let unbounded = RetryPolicy {
            attempt_timeout: None,
            ..policy
        };
        assert_eq!(unbounded.worst_case_duration(), None);
    }

    #[test]
    fn test_disposition_retryable() {
        assert!(!Disposition::Terminal.is_retryable());
        assert!(Disposition::RetryImmediately.is_retryable());
        assert!(Disposition::RetryWithBackoff.is_retryable());
    }
}

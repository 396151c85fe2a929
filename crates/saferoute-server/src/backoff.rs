//! Bounded exponential backoff for external lookups.
//!
//! The schedule is a pure function of the attempt number; sleeping and
//! calling live in [`retry_transient`], which only retries errors that
//! [`FetchError::is_transient`] accepts.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::config::Config;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub factor: u32,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2,
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base: Duration::from_millis(config.retry_base_ms),
            factor: config.retry_factor.max(1),
            max_attempts: config.retry_max_attempts.max(1),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = self.factor.saturating_pow(exponent);
        self.base.saturating_mul(multiplier)
    }
}

/// Result of a retried call and how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub attempts_made: u32,
    pub outcome: Result<T, FetchError>,
}

pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut call: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match call().await {
            Ok(value) => {
                return RetryOutcome {
                    attempts_made: attempt,
                    outcome: Ok(value),
                }
            }
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "{} attempt {}/{} failed ({}), retrying in {:?}",
                    label,
                    attempt,
                    max_attempts,
                    err,
                    delay
                );
                sleep(delay).await;
            }
            Err(err) => {
                return RetryOutcome {
                    attempts_made: attempt,
                    outcome: Err(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            base: Duration::from_millis(1),
            factor: 2,
            max_attempts: 3,
        }
    }

    fn server_error() -> FetchError {
        FetchError::Http {
            url: "http://x".to_string(),
            status: 503,
        }
    }

    #[test]
    fn schedule_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn schedule_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            base: Duration::from_secs(1),
            factor: 10,
            max_attempts: 3,
        };
        assert_eq!(
            policy.delay_for(200),
            Duration::from_secs(u64::from(u32::MAX))
        );
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_transient(&fast_policy(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(server_error())
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.attempts_made, 3);
        assert_eq!(result.outcome, Ok(7));
    }

    #[tokio::test]
    async fn attempts_are_capped() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: RetryOutcome<()> = retry_transient(&fast_policy(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        })
        .await;
        assert_eq!(result.attempts_made, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(result.outcome.is_err());
    }

    #[tokio::test]
    async fn client_errors_abort_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: RetryOutcome<()> = retry_transient(&fast_policy(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Http {
                url: "http://x".to_string(),
                status: 400,
            })
        })
        .await;
        assert_eq!(result.attempts_made, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

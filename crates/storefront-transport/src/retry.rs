//! Retry policy for catalog requests.

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u64.saturating_pow(attempt);
                let delay =
                    Duration::from_millis((base.as_millis() as u64).saturating_mul(multiplier));
                std::cmp::min(delay, *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(5),
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
        }
    }

    /// Create a policy with a single attempt and no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::None,
        }
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Whether another attempt should follow after `attempts_made` failures.
    pub fn should_retry(&self, error: &TransportError, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts.saturating_sub(1) && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Drive `op` under the policy: retryable failures are retried with backoff
/// until the attempt budget runs out, permanent failures propagate at once.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, TransportError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 0u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(&error, attempt) => {
                let delay = policy.backoff.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "retrying catalog request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_exponential_backoff_schedule() {
        let backoff = BackoffStrategy::default();
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_secs(4));
        // Capped: 8s would exceed the 5s max.
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry_respects_budget_and_class() {
        let policy = RetryPolicy::default();
        let transient = TransportError::Timeout;
        let permanent = TransportError::Http { status: 404 };
        assert!(policy.should_retry(&transient, 0));
        assert!(policy.should_retry(&transient, 1));
        assert!(!policy.should_retry(&transient, 2));
        assert!(!policy.should_retry(&permanent, 0));
    }

    #[tokio::test]
    async fn test_transient_failures_then_success_takes_three_attempts() {
        let policy = RetryPolicy::default().with_backoff(BackoffStrategy::None);
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&policy, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TransportError::Http { status: 503 })
                } else {
                    Ok("data")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "data");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_after_one_attempt() {
        let policy = RetryPolicy::default().with_backoff(BackoffStrategy::None);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TransportError::GraphQl("field does not exist".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_surfaces_last_error() {
        let policy = RetryPolicy::default().with_backoff(BackoffStrategy::None);
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = run_with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TransportError::Timeout) }
        })
        .await;
        assert!(matches!(result, Err(TransportError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

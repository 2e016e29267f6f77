//! Bounded retry for rate-limited provider calls
//!
//! Fixed-interval backoff, attempt-scoped: an operation runs at most
//! `max_attempts` times in total, sleeping `backoff` between attempts, and
//! only when the failure is rate limiting. Any other error propagates
//! immediately. The sleep suspends only the requesting task.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::ProviderError;

/// Retry policy for remote provider calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of calls, including the first
    pub max_attempts: u32,

    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Run `op` under `policy`, retrying only on [`ProviderError::RateLimited`].
///
/// Returns the first success, the first non-rate-limit error, or the final
/// rate-limit error once attempts are exhausted.
pub async fn retry_rate_limited<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ProviderError::RateLimited) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    backoff_secs = policy.backoff.as_secs_f64(),
                    "Rate limit exceeded, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_makes_exactly_three_calls() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_rate_limited(policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::RateLimited) }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::RateLimited)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_second_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_rate_limited(policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::RateLimited)
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limit_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_rate_limited(policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::Malformed("bad payload".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Malformed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_makes_one_call() {
        let calls = AtomicU32::new(0);
        let result = retry_rate_limited(policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("answer") }
        })
        .await;

        assert_eq!(result.unwrap(), "answer");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_rate_limited(policy(0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::RateLimited) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_fixed_interval() {
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = retry_rate_limited(policy(3), || async {
            Err(ProviderError::RateLimited)
        })
        .await;

        // Two sleeps between three attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}

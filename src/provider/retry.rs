//! Retry with linear backoff for provider calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;
use crate::provider::domain::ProviderError;

/// How often and how patiently a provider call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `base_delay * n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(600))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// Only [`ProviderError::is_retryable`] failures are retried. Cancellation
/// during a backoff wait returns [`ProviderError::Cancelled`] immediately and
/// is not counted as a failed attempt. The operation itself is never
/// interrupted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                if token.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(ProviderError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
            Err(err) => {
                if err.is_retryable() {
                    tracing::warn!("Giving up after {} attempts: {}", attempt, err);
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(600));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1200));
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_attempts_three_times() {
        let attempts = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();

        let counter = attempts.clone();
        let result: Result<(), _> = with_retry(&RetryPolicy::default(), &token, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Transient("HTTP 503".into()))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ProviderError::Transient(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_attempts_once() {
        let attempts = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();

        let counter = attempts.clone();
        let result: Result<(), _> = with_retry(&RetryPolicy::default(), &token, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::NoResults("lofi".into()))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ProviderError::NoResults(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failure() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();

        let result = with_retry(&RetryPolicy::default(), &token, |attempt| async move {
            if attempt < 3 {
                Err(ProviderError::Transient("timeout".into()))
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        // 600ms after the first attempt, 1200ms after the second
        assert!(start.elapsed() >= Duration::from_millis(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_aborts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let counter = attempts.clone();
        let result: Result<(), _> = with_retry(&RetryPolicy::default(), &token, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Transient("HTTP 429".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

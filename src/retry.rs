//! Exponential backoff retry policy for external service calls.
//!
//! Every outbound API call goes through the same policy: a bounded number of
//! attempts with exponentially growing delays, capped at a maximum. Exhausting
//! the budget surfaces the last error to the caller.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    factor: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32, base_delay: Duration, factor: f64, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            factor,
            max_delay,
        }
    }

    /// Policy that never retries. Useful in tests.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0, Duration::ZERO)
    }

    /// Delay before retry number `n_past_attempts + 1`, capped at the maximum.
    pub fn delay_for(&self, n_past_attempts: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.factor.powi(n_past_attempts as i32);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// Run an operation, retrying failures until the attempt budget runs out.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(
                            "{} failed after {} attempts, giving up: {}",
                            op_name, attempt, e
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        op_name,
                        attempt,
                        self.max_attempts,
                        delay.as_secs_f64(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // Matches the upstream rate-limit behavior we see in practice:
        // 1s, 4s, 16s, then capped.
        Self::new(10, Duration::from_secs(1), 4.0, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferatError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_progression() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), 4.0, Duration::from_secs(60));

        assert_eq!(policy.delay_for(0).as_secs(), 1);
        assert_eq!(policy.delay_for(1).as_secs(), 4);
        assert_eq!(policy.delay_for(2).as_secs(), 16);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), 4.0, Duration::from_secs(60));
        assert_eq!(policy.delay_for(9).as_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_eventually_succeed() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10), 2.0, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run("test-op", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(ReferatError::OpenAI("rate limited".to_string()))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_surfaces_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), 2.0, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        let result: Result<()> = policy
            .run("test-op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ReferatError::OpenAI("still down".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(ReferatError::OpenAI(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

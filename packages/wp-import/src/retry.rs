//! Bounded retry for transient remote failures.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Retry policy for create/publish/process calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        // Exponential: base, 2x, 4x, ...
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Run `op` until it succeeds, fails non-transiently, or the attempt
/// budget is spent. Exhaustion returns the last error unchanged.
pub async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    op_name: &str,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    op = op_name,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(policy.delay_for(attempt)).await;
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

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn transient_errors_are_absorbed() {
        let attempts = AtomicU32::new(0);
        let result = retry(quick_policy(5), "test op", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StoreError::Api {
                        status: 503,
                        message: "unavailable".into(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_fail_fast() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry(quick_policy(5), "test op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StoreError::Api {
                    status: 400,
                    message: "bad request".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Api { status: 400, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry(quick_policy(3), "test op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Transport("connection reset".into())) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}

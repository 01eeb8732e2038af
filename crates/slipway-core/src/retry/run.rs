//! Retry loop: run an async operation until success or policy says stop.

use super::classify;
use super::error::UploadError;
use super::policy::{RetryDecision, RetryPolicy};
use std::future::Future;

/// Runs an async operation until it succeeds or the retry policy says to
/// stop. On retryable failure, sleeps for the backoff duration then tries
/// again; after the budget is exhausted the last error is returned.
pub async fn run_with_retry<F, Fut>(policy: &RetryPolicy, mut f: F) -> Result<(), UploadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), UploadError>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            "attempt {}/{} failed ({}), retrying in {:?}",
                            attempt,
                            policy.max_attempts,
                            e,
                            d
                        );
                        tokio::time::sleep(d).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_k_transient_failures() {
        let calls = Cell::new(0u32);
        let result = run_with_retry(&quick_policy(5), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n <= 3 {
                    Err(UploadError::Http(500))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts() {
        let calls = Cell::new(0u32);
        let result = run_with_retry(&quick_policy(3), || {
            calls.set(calls.get() + 1);
            async { Err(UploadError::Http(503)) }
        })
        .await;
        assert!(matches!(result, Err(UploadError::Http(503))));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_fails_on_first_attempt() {
        let calls = Cell::new(0u32);
        let result = run_with_retry(&quick_policy(5), || {
            calls.set(calls.get() + 1);
            async { Err(UploadError::Http(404)) }
        })
        .await;
        assert!(matches!(result, Err(UploadError::Http(404))));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_double_between_attempts() {
        let start = tokio::time::Instant::now();
        let calls = Cell::new(0u32);
        let _ = run_with_retry(&quick_policy(4), || {
            calls.set(calls.get() + 1);
            async { Err(UploadError::Http(500)) }
        })
        .await;
        // Three sleeps: 10ms + 20ms + 40ms.
        assert_eq!(calls.get(), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(70));
    }
}

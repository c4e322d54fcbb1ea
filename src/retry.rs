//! Bounded retry with exponential backoff for upstream calls.
//!
//! Every fetch against the fleet API goes through [`retry_with_backoff`].
//! The loop is sequential: one attempt in flight at a time, a cooperative
//! `tokio::time::sleep` between attempts, and no jitter. Once invoked it
//! runs to success or exhaustion; there is no cancellation path.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;

// ---

/// Run `operation` until it succeeds or `max_attempts` tries are spent.
///
/// Between attempt `i` and `i + 1` (0-indexed) the loop sleeps
/// `base_delay * 2^i`. Non-retryable failures ([`FetchError::Validation`],
/// [`FetchError::Parse`]) short-circuit on first sight, and the error
/// observed on the final attempt is handed back unchanged so callers can
/// inspect the original failure.
pub async fn retry_with_backoff<T, F, Fut>(
    mut operation: F,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    // ---
    let max_attempts = max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(err);
                }

                let delay = base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(
                    "attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, max_attempts, err, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn network_err() -> FetchError {
        FetchError::Network("connection reset".into())
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        // ---
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FetchError>(7) }
            },
            3,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn two_failures_then_success_waits_the_backoff_schedule() {
        // ---
        let started = Instant::now();
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(network_err())
                    } else {
                        Ok("live data")
                    }
                }
            },
            3,
            Duration::from_millis(1000),
        )
        .await;

        assert_eq!(result, Ok("live data"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1000ms after the first failure, 2000ms after the second.
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_propagates_the_last_error_unchanged() {
        // ---
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(FetchError::Server {
                        status: 503,
                        message: "maintenance".into(),
                    })
                }
            },
            3,
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(FetchError::Server { status: 503, message: "maintenance".into() })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn validation_errors_are_not_retried() {
        // ---
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(FetchError::Validation("bad range".into())) }
            },
            5,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, Err(FetchError::Validation("bad range".into())));
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        // ---
        let result = retry_with_backoff(
            || async { Ok::<_, FetchError>(1) },
            0,
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(result, Ok(1));
    }
}

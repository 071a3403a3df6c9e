//! Bounded retry helper
//!
//! One attempt budget and a fixed inter-attempt delay; the outcome is a tag,
//! not an exception, so callers can demote exhaustion to a "no result for
//! this page" signal without unwinding the run.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// Outcome of a bounded retry loop
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// An attempt succeeded
    Success(T),
    /// All attempts failed; carries the last error observed
    Exhausted {
        /// Error from the final attempt
        last_error: Error,
        /// How many attempts were made
        attempts: u32,
    },
}

impl<T> RetryOutcome<T> {
    /// Convert to an Option, discarding the failure detail
    pub fn success(self) -> Option<T> {
        match self {
            RetryOutcome::Success(value) => Some(value),
            RetryOutcome::Exhausted { .. } => None,
        }
    }
}

/// Run `op` up to `max_attempts` times, sleeping `delay` between attempts.
///
/// Every attempt issues the identical operation; retries target the same
/// page, not a recovery point. A non-retryable error short-circuits the
/// budget, since repeating it cannot change the answer.
pub async fn with_retries<T, F, Fut>(max_attempts: u32, delay: Duration, mut op: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return RetryOutcome::Success(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    "attempt {attempt}/{max_attempts} failed: {e}, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return RetryOutcome::Exhausted {
                    last_error: e,
                    attempts: attempt,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let outcome = with_retries(3, Duration::ZERO, || async { Ok::<_, Error>(7) }).await;
        assert!(matches!(outcome, RetryOutcome::Success(7)));
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let calls = AtomicU32::new(0);
        let outcome = with_retries(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(Error::graphql("transient"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Success(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget() {
        let calls = AtomicU32::new(0);
        let outcome = with_retries(2, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Error::malformed("always broken")) }
        })
        .await;

        match outcome {
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.to_string().contains("always broken"));
            }
            RetryOutcome::Success(()) => panic!("expected exhaustion"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_short_circuits() {
        let calls = AtomicU32::new(0);
        let outcome = with_retries(5, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Error::validation("bad range")) }
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_still_attempts_once() {
        let outcome = with_retries(0, Duration::ZERO, || async { Ok::<_, Error>("x") }).await;
        assert!(outcome.success().is_some());
    }
}

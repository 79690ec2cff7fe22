//! Exponential backoff around an arbitrary async operation.

use std::future::Future;
use std::time::Duration;

use super::RetryPolicy;
use crate::error::ApiError;
use crate::time::Sleeper;

/// A retry that is about to happen.
///
/// Passed to the retry callback before sleeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// Retry number, starting at 1 for the first retry.
    pub attempt: u32,
    /// Delay before the retry runs.
    pub delay: Duration,
    /// Error that triggered the retry.
    pub error: ApiError,
}

/// Runs `operation` until it succeeds or the policy gives up.
///
/// On failure the error is returned unchanged when its code is
/// non-retryable or `policy.max_retries` retries have already run.
/// Otherwise `on_retry` is called, the sleeper waits
/// `policy.delay_for_retry(n)` and the operation runs again. The operation
/// therefore runs at most `max_retries + 1` times.
///
/// # Errors
///
/// Returns the last error produced by `operation`.
pub async fn retry_with_backoff<T, F, Fut, S, R>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut on_retry: R,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    S: Sleeper,
    R: FnMut(&RetryAttempt),
{
    let mut retries = 0u32;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !policy.is_retryable(&error) {
            tracing::debug!(code = error.code(), "Not retrying: {error}");
            return Err(error);
        }
        if retries >= policy.max_retries {
            tracing::debug!(retries, "Retries exhausted: {error}");
            return Err(error);
        }

        let delay = policy.delay_for_retry(retries);
        retries += 1;

        tracing::warn!(
            attempt = retries,
            max_retries = policy.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Retrying after error: {error}"
        );
        on_retry(&RetryAttempt {
            attempt: retries,
            delay,
            error,
        });

        sleeper.sleep(delay).await;
    }
}

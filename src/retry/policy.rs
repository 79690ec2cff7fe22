//! Retry policy configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{ApiError, code};

/// Configuration for exponential backoff.
///
/// The delay before retry `n` (0-indexed) is `base_delay * 2^n`, with no
/// jitter. An operation runs at most `max_retries + 1` times; errors whose
/// code is in `non_retryable` are returned after the first failure.
///
/// # Presets
///
/// | Preset | `max_retries` | `base_delay` |
/// |--------|---------------|--------------|
/// | [`RetryPolicy::production`] (also `default`) | 5 | 500 ms |
/// | [`RetryPolicy::for_tests`] | 3 | 100 ms |
///
/// Both use the non-retryable set `{400, 401, 403, 404}`.
///
/// # Example
///
/// ```
/// use imessage_sdk::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::production()
///     .with_max_retries(2)
///     .with_base_delay(Duration::from_millis(250))
///     .with_non_retryable([400, 401, 403, 404, 429]);
/// assert_eq!(policy.delay_for_retry(1), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Error codes that are returned immediately.
    pub non_retryable: BTreeSet<u16>,
}

impl RetryPolicy {
    /// Production retry count.
    pub const PRODUCTION_MAX_RETRIES: u32 = 5;

    /// Production base delay.
    pub const PRODUCTION_BASE_DELAY: Duration = Duration::from_millis(500);

    /// Test retry count.
    pub const TEST_MAX_RETRIES: u32 = 3;

    /// Test base delay.
    pub const TEST_BASE_DELAY: Duration = Duration::from_millis(100);

    /// Codes never retried by default.
    pub const DEFAULT_NON_RETRYABLE: [u16; 4] = [
        code::BAD_REQUEST,
        code::UNAUTHORIZED,
        code::FORBIDDEN,
        code::NOT_FOUND,
    ];

    /// Policy for talking to the live API.
    #[must_use]
    pub fn production() -> Self {
        Self {
            max_retries: Self::PRODUCTION_MAX_RETRIES,
            base_delay: Self::PRODUCTION_BASE_DELAY,
            non_retryable: BTreeSet::from(Self::DEFAULT_NON_RETRYABLE),
        }
    }

    /// Shorter policy for test suites.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            max_retries: Self::TEST_MAX_RETRIES,
            base_delay: Self::TEST_BASE_DELAY,
            non_retryable: BTreeSet::from(Self::DEFAULT_NON_RETRYABLE),
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::production().with_max_retries(0)
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay.
    ///
    /// Zero is allowed (useful with paused tokio time) but creates a tight
    /// loop against a real server.
    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Replaces the non-retryable code set.
    #[must_use]
    pub fn with_non_retryable(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.non_retryable = codes.into_iter().collect();
        self
    }

    /// Delay before retry `retry` (0 = first retry). Saturates instead of
    /// overflowing for absurd retry counts.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Returns true if `error` may be retried under this policy.
    #[must_use]
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        !self.non_retryable.contains(&error.code())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::production()
    }
}

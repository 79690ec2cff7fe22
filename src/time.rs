//! Time abstractions for testability.
//!
//! This module provides a [`Clock`] trait for measuring elapsed time and a
//! [`Sleeper`] trait for suspending between attempts, so that retry and
//! polling loops can run against mocked time in tests.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Abstraction over a monotonic clock.
///
/// Implementations return the current instant; the status poller uses it
/// to enforce its hard timeout.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Production clock backed by [`tokio::time::Instant`].
///
/// Under a paused tokio runtime (`start_paused = true`) this clock follows
/// the runtime's virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Abstraction over asynchronous sleeping.
///
/// Retry backoff and status polling wait through this trait.
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper delegating to [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
///
/// Useful in tests that exercise retry counts without caring about delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

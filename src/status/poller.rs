//! Polling a message until it reaches a target status.
//!
//! This module provides [`StatusPoller`], which repeatedly checks a
//! message's status through a [`StatusSource`] and publishes every check,
//! every status transition and timeouts on its [`EventBus`].

use std::future::Future;
use std::time::Duration;

use super::{MessageStatus, StatusResponse, StatusTarget};
use crate::config::defaults;
use crate::error::ApiError;
use crate::events::{Event, EventBus, StatusChanged, StatusChecked, StatusTimeout};
use crate::http::{ApiClient, HttpClient};
use crate::time::{Clock, Sleeper, TokioClock, TokioSleeper};

/// Something that can report the current status of a message.
///
/// Implemented by [`ApiClient`]; tests substitute scripted sources.
pub trait StatusSource: Send + Sync {
    /// Fetches the current status of `message_id`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the lookup.
    fn check_status(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ApiError>> + Send;
}

impl<H, S> StatusSource for ApiClient<H, S>
where
    H: HttpClient,
    S: Sleeper,
{
    fn check_status(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ApiError>> + Send {
        Self::check_status(self, message_id)
    }
}

/// Bounds for [`StatusPoller::wait_for_status`].
///
/// # Defaults
///
/// - `max_attempts`: 10
/// - `delay`: 2 seconds
/// - `timeout`: 30 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Status checks before the final best-effort read.
    pub max_attempts: u32,

    /// Delay between checks.
    pub delay: Duration,

    /// Overall time budget. `Duration::ZERO` disables it.
    pub timeout: Duration,
}

impl WaitOptions {
    /// Minimum allowed `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates options with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: defaults::WAIT_MAX_ATTEMPTS,
            delay: defaults::wait_delay(),
            timeout: defaults::wait_timeout(),
        }
    }

    /// Sets the number of checks before the final read.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between checks.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the overall timeout; zero disables it.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    const fn has_timeout(&self) -> bool {
        !self.timeout.is_zero()
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for messages to reach a target status.
///
/// # Type Parameters
///
/// - `S`: Sleeper used between checks
/// - `C`: Clock used for the timeout
///
/// # Example
///
/// ```no_run
/// use imessage_sdk::config::Credentials;
/// use imessage_sdk::http::ApiClient;
/// use imessage_sdk::status::{MessageStatus, StatusPoller, WaitOptions};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let api = ApiClient::new(Credentials::new("auth", "secret")?);
/// let poller = StatusPoller::new();
///
/// let status = poller
///     .wait_for_status(&api, "msg-id", MessageStatus::Sent, &WaitOptions::default())
///     .await?;
/// println!("{}", status.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StatusPoller<S = TokioSleeper, C = TokioClock> {
    sleeper: S,
    clock: C,
    events: EventBus,
}

impl StatusPoller {
    /// Creates a poller driven by tokio time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_time(TokioSleeper, TokioClock)
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> StatusPoller<S, C>
where
    S: Sleeper,
    C: Clock,
{
    /// Creates a poller with a custom sleeper and clock.
    #[must_use]
    pub fn with_time(sleeper: S, clock: C) -> Self {
        Self {
            sleeper,
            clock,
            events: EventBus::new(),
        }
    }

    /// Returns the bus that receives status events.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Polls `message_id` until its status is in `target`.
    ///
    /// Each round first enforces `options.timeout`, then checks the status.
    /// A `failed` status ends the wait successfully even when it is not a
    /// target. After `options.max_attempts` checks without a match, one
    /// last check is made and its result returned as is.
    ///
    /// # Errors
    ///
    /// - 400 if `target` is empty or `message_id` is blank (no I/O happens)
    /// - 408 once the timeout elapses
    /// - any error from a status check, unchanged
    pub async fn wait_for_status<Src>(
        &self,
        source: &Src,
        message_id: &str,
        target: impl Into<StatusTarget>,
        options: &WaitOptions,
    ) -> Result<StatusResponse, ApiError>
    where
        Src: StatusSource + ?Sized,
    {
        let target = target.into();
        if target.is_empty() {
            return Err(ApiError::bad_request("At least one target status is required"));
        }
        if message_id.trim().is_empty() {
            return Err(ApiError::bad_request("Message ID is required"));
        }

        let start = self.clock.now();
        let mut previous: Option<MessageStatus> = None;
        let mut attempts = 0u32;

        loop {
            let elapsed = self.clock.now().duration_since(start);
            if options.has_timeout() && elapsed >= options.timeout {
                return Err(self.timed_out(message_id, &target, elapsed, attempts));
            }

            let response = self.check(source, message_id, attempts + 1).await?;
            let current = response.status;

            if let Some(prev) = previous.filter(|prev| *prev != current) {
                tracing::debug!(message_id, %prev, %current, "Message status changed");
                self.events.publish(&Event::StatusChanged(StatusChanged {
                    message_id: message_id.to_string(),
                    previous: prev,
                    current,
                    response: response.clone(),
                }));
            }
            previous = Some(current);

            if target.contains(current) {
                tracing::info!(message_id, status = %current, "Message reached target status");
                return Ok(response);
            }
            if current == MessageStatus::Failed {
                tracing::info!(message_id, "Message failed before reaching target status");
                return Ok(response);
            }

            attempts += 1;
            if attempts >= options.max_attempts {
                tracing::warn!(
                    message_id,
                    attempts,
                    status = %current,
                    "Status checks exhausted, returning final status"
                );
                return self.check(source, message_id, attempts + 1).await;
            }

            self.sleeper.sleep(options.delay).await;
        }
    }

    async fn check<Src>(
        &self,
        source: &Src,
        message_id: &str,
        attempt: u32,
    ) -> Result<StatusResponse, ApiError>
    where
        Src: StatusSource + ?Sized,
    {
        let result = source.check_status(message_id).await;

        match &result {
            Ok(response) => {
                tracing::debug!(message_id, attempt, status = %response.status, "Status checked");
            }
            Err(error) => tracing::debug!(message_id, attempt, "Status check failed: {error}"),
        }

        self.events.publish(&Event::StatusChecked(StatusChecked {
            message_id: message_id.to_string(),
            attempt,
            result: result.clone(),
        }));

        result
    }

    fn timed_out(
        &self,
        message_id: &str,
        target: &StatusTarget,
        elapsed: Duration,
        attempts: u32,
    ) -> ApiError {
        let wanted = target
            .statuses()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        tracing::warn!(
            message_id,
            attempts,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Timed out waiting for status"
        );

        self.events.publish(&Event::StatusTimeout(StatusTimeout {
            message_id: message_id.to_string(),
            target: target.statuses().to_vec(),
            elapsed,
            attempts,
        }));

        ApiError::timeout(format!(
            "Message {message_id} did not reach [{wanted}] within {}ms",
            elapsed.as_millis()
        ))
    }
}

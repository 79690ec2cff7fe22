//! Notifications emitted by the client components.
//!
//! Components publish [`Event`]s on their own [`EventBus`]; the
//! [`MessagingClient`](crate::MessagingClient) subscribes to each of them
//! and republishes everything on a single bus, so consumers only need one
//! subscription list.
//!
//! ```text
//! ┌──────────────┐  Retry
//! │  ApiClient   │ ───────────┐
//! └──────────────┘            │
//! ┌──────────────┐  Status*   ▼        ┌──────────────────┐
//! │ StatusPoller │ ─────▶ forwarding ─▶│ MessagingClient  │──▶ subscribers
//! └──────────────┘            ▲        │     EventBus     │
//! ┌──────────────┐  Webhook   │        └──────────────────┘
//! │ Verifier     │ ───────────┘
//! └──────────────┘
//! ```

mod bus;


use std::time::Duration;

pub use bus::{EventBus, SubscriptionId};

use crate::error::ApiError;
use crate::http::EndpointKind;
use crate::retry::RetryAttempt;
use crate::status::{MessageStatus, StatusResponse};
use crate::webhook::{WebhookKind, WebhookPayload};

/// Subscription filter for [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Every individual status check, successful or not.
    StatusChecked,
    /// A status differed from the previous poll.
    StatusChanged,
    /// A wait hit its time budget.
    StatusTimeout,
    /// A request is about to be retried.
    Retry,
    /// A verified webhook of one specific kind.
    Webhook(WebhookKind),
    /// Any verified webhook.
    AnyWebhook,
}

/// A single status check made while waiting.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChecked {
    /// Message being waited on.
    pub message_id: String,
    /// 1-based check number within the wait.
    pub attempt: u32,
    /// What the check returned, including failed checks.
    pub result: Result<StatusResponse, ApiError>,
}

/// A status transition observed between two consecutive checks.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChanged {
    /// Message being waited on.
    pub message_id: String,
    /// Status seen by the earlier check.
    pub previous: MessageStatus,
    /// Status seen by the latest check.
    pub current: MessageStatus,
    /// Full response of the latest check.
    pub response: StatusResponse,
}

/// A wait that gave up because its timeout elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTimeout {
    /// Message being waited on.
    pub message_id: String,
    /// Statuses the wait would have accepted.
    pub target: Vec<MessageStatus>,
    /// Time spent since the wait started.
    pub elapsed: Duration,
    /// Checks completed before giving up.
    pub attempts: u32,
}

/// A retry scheduled by the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRetry {
    /// Endpoint family of the failing call.
    pub endpoint: EndpointKind,
    /// URL path of the failing call.
    pub path: String,
    /// Attempt number, delay and the error that triggered it.
    pub retry: RetryAttempt,
}

/// A notification published on an [`EventBus`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// See [`StatusChecked`].
    StatusChecked(StatusChecked),
    /// See [`StatusChanged`].
    StatusChanged(StatusChanged),
    /// See [`StatusTimeout`].
    StatusTimeout(StatusTimeout),
    /// See [`RequestRetry`].
    Retry(RequestRetry),
    /// Delivered to subscribers of `EventKind::Webhook(payload.kind())`.
    Webhook(WebhookPayload),
    /// Delivered to subscribers of `EventKind::AnyWebhook`.
    AnyWebhook(WebhookPayload),
}

impl Event {
    /// The filter this event matches.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::StatusChecked(_) => EventKind::StatusChecked,
            Self::StatusChanged(_) => EventKind::StatusChanged,
            Self::StatusTimeout(_) => EventKind::StatusTimeout,
            Self::Retry(_) => EventKind::Retry,
            Self::Webhook(payload) => EventKind::Webhook(payload.kind()),
            Self::AnyWebhook(_) => EventKind::AnyWebhook,
        }
    }
}

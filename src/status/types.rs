//! Message status values reported by the API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Delivery status of a message.
///
/// Values the API may add in the future decode as [`MessageStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Accepted and queued for delivery.
    Processing,
    /// Held until its scheduled send time.
    Scheduled,
    /// Delivery failed; see `error_code`.
    Failed,
    /// Delivered to the recipient's service.
    Sent,
    /// The provider gave up on delivery.
    Timeout,
    /// Any status this version does not know.
    #[serde(other)]
    Unknown,
}

impl MessageStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Scheduled => "scheduled",
            Self::Failed => "failed",
            Self::Sent => "sent",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of a status check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Id returned when the message was sent.
    pub message_id: String,
    /// Current delivery status.
    pub status: MessageStatus,
    /// Phone number or email the message went to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Text as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Provider error code, set for `failed` and `timeout` messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    /// Sender name the message went out under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Caller data echoed back from the send request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<String>,
    /// Server timestamp of the last status change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusResponse {
    /// Creates a response with only id and status set.
    #[must_use]
    pub fn new(message_id: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            message_id: message_id.into(),
            status,
            recipient: None,
            text: None,
            error_code: None,
            sender_name: None,
            passthrough: None,
            last_update: None,
            extra: Map::new(),
        }
    }
}

/// One or more statuses a wait should stop at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTarget(Vec<MessageStatus>);

impl StatusTarget {
    /// Returns true if `status` is part of the target set.
    #[must_use]
    pub fn contains(&self, status: MessageStatus) -> bool {
        self.0.contains(&status)
    }

    /// True when no status was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The target statuses, in the order given.
    #[must_use]
    pub fn statuses(&self) -> &[MessageStatus] {
        &self.0
    }
}

impl From<MessageStatus> for StatusTarget {
    fn from(status: MessageStatus) -> Self {
        Self(vec![status])
    }
}

impl From<Vec<MessageStatus>> for StatusTarget {
    fn from(mut statuses: Vec<MessageStatus>) -> Self {
        statuses.dedup();
        Self(statuses)
    }
}

impl<const N: usize> From<[MessageStatus; N]> for StatusTarget {
    fn from(statuses: [MessageStatus; N]) -> Self {
        Self::from(statuses.to_vec())
    }
}

impl From<&[MessageStatus]> for StatusTarget {
    fn from(statuses: &[MessageStatus]) -> Self {
        Self::from(statuses.to_vec())
    }
}

//! Inbound webhook payloads.
//!
//! Payloads are a tagged union keyed by the `type` field. Each variant
//! carries its type-specific fields plus the shared `timestamp`; fields
//! not modelled here are kept in `extra`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Discriminant of a [`WebhookPayload`], usable as a subscription filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookKind {
    /// `message_inbound`
    MessageInbound,
    /// `message_sent`
    MessageSent,
    /// `message_failed`
    MessageFailed,
    /// `message_scheduled`
    MessageScheduled,
    /// `message_timeout`
    MessageTimeout,
    /// `message_reaction`
    MessageReaction,
    /// `group_created`
    GroupCreated,
    /// `conversation_inited`
    ConversationInited,
    /// A `type` this crate does not know about.
    Other,
}

impl WebhookKind {
    /// Maps a wire `type` value to its kind.
    #[must_use]
    pub fn from_type(value: &str) -> Self {
        match value {
            "message_inbound" => Self::MessageInbound,
            "message_sent" => Self::MessageSent,
            "message_failed" => Self::MessageFailed,
            "message_scheduled" => Self::MessageScheduled,
            "message_timeout" => Self::MessageTimeout,
            "message_reaction" => Self::MessageReaction,
            "group_created" => Self::GroupCreated,
            "conversation_inited" => Self::ConversationInited,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageInbound => "message_inbound",
            Self::MessageSent => "message_sent",
            Self::MessageFailed => "message_failed",
            Self::MessageScheduled => "message_scheduled",
            Self::MessageTimeout => "message_timeout",
            Self::MessageReaction => "message_reaction",
            Self::GroupCreated => "group_created",
            Self::ConversationInited => "conversation_inited",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Group chat details attached to group events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Server-assigned group id.
    pub group_id: String,
    /// Display name, if the group has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Member handles (phone numbers or emails).
    #[serde(default)]
    pub participants: Vec<String>,
}

/// A message received from an end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Id of the message this event is about.
    pub message_id: String,
    /// End user handle (phone number or email).
    #[serde(default)]
    pub recipient: Option<String>,
    /// Group chat the event belongs to.
    #[serde(default)]
    pub group: Option<GroupInfo>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Sender name the conversation runs under.
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Attachment URLs.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Reply thread, when the message answers another.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A sent or scheduled outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryUpdate {
    /// Id of the message this event is about.
    pub message_id: String,
    /// End user handle (phone number or email).
    #[serde(default)]
    pub recipient: Option<String>,
    /// Group chat the event belongs to.
    #[serde(default)]
    pub group: Option<GroupInfo>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Sender name the conversation runs under.
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Caller data from the send request.
    #[serde(default)]
    pub passthrough: Option<String>,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An outgoing message that failed or timed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// Id of the message this event is about.
    pub message_id: String,
    /// End user handle (phone number or email).
    #[serde(default)]
    pub recipient: Option<String>,
    /// Group chat the event belongs to.
    #[serde(default)]
    pub group: Option<GroupInfo>,
    /// Provider error code.
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Caller data from the send request.
    #[serde(default)]
    pub passthrough: Option<String>,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reaction an end user left on a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionReceived {
    /// Id of the message this event is about.
    pub message_id: String,
    /// Reaction name, e.g. `love` or `like`.
    pub reaction: String,
    /// End user handle (phone number or email).
    #[serde(default)]
    pub recipient: Option<String>,
    /// Group chat the event belongs to.
    #[serde(default)]
    pub group: Option<GroupInfo>,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A group chat that was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCreated {
    /// Group chat the event belongs to.
    pub group: GroupInfo,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An end user opened a conversation with the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInited {
    /// End user handle (phone number or email).
    pub recipient: String,
    /// Sender name the conversation runs under.
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Event time as sent by the server.
    pub timestamp: String,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A verified, parsed webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    /// An end user wrote to the sender.
    MessageInbound(InboundMessage),
    /// An outgoing message was delivered.
    MessageSent(DeliveryUpdate),
    /// An outgoing message was queued for later.
    MessageScheduled(DeliveryUpdate),
    /// An outgoing message failed.
    MessageFailed(DeliveryFailure),
    /// An outgoing message timed out.
    MessageTimeout(DeliveryFailure),
    /// An end user reacted to a message.
    MessageReaction(ReactionReceived),
    /// A group chat was created.
    GroupCreated(GroupCreated),
    /// An end user opened a conversation.
    ConversationInited(ConversationInited),
    /// A webhook whose `type` is not modelled; the full body is kept.
    Other {
        /// Raw `type` value.
        kind: String,
        /// Event time as sent by the server.
        timestamp: String,
        /// Remaining fields, without `type`.
        body: Map<String, Value>,
    },
}

impl WebhookPayload {
    /// The kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> WebhookKind {
        match self {
            Self::MessageInbound(_) => WebhookKind::MessageInbound,
            Self::MessageSent(_) => WebhookKind::MessageSent,
            Self::MessageScheduled(_) => WebhookKind::MessageScheduled,
            Self::MessageFailed(_) => WebhookKind::MessageFailed,
            Self::MessageTimeout(_) => WebhookKind::MessageTimeout,
            Self::MessageReaction(_) => WebhookKind::MessageReaction,
            Self::GroupCreated(_) => WebhookKind::GroupCreated,
            Self::ConversationInited(_) => WebhookKind::ConversationInited,
            Self::Other { .. } => WebhookKind::Other,
        }
    }

    /// The shared event timestamp.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::MessageInbound(m) => &m.timestamp,
            Self::MessageSent(d) | Self::MessageScheduled(d) => &d.timestamp,
            Self::MessageFailed(f) | Self::MessageTimeout(f) => &f.timestamp,
            Self::MessageReaction(r) => &r.timestamp,
            Self::GroupCreated(g) => &g.timestamp,
            Self::ConversationInited(c) => &c.timestamp,
            Self::Other { timestamp, .. } => timestamp,
        }
    }

    /// Decodes a payload from bytes whose signature was already checked.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] with message "Invalid JSON payload" for
    /// syntax errors, and "Invalid webhook payload" when the body is not an
    /// object, lacks `type`/`timestamp`, or has malformed variant fields.
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ApiError::new("Invalid JSON payload", crate::error::code::BAD_REQUEST)
                .with_cause(e.to_string())
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ApiError> {
        let Value::Object(mut body) = value else {
            return Err(invalid_payload("webhook body must be a JSON object"));
        };

        let kind = match body.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(_) => return Err(invalid_payload("field 'type' must be a string")),
            None => return Err(invalid_payload("missing required field 'type'")),
        };
        let timestamp = match body.get("timestamp") {
            Some(Value::String(ts)) => ts.clone(),
            Some(Value::Number(ts)) => ts.to_string(),
            Some(_) => return Err(invalid_payload("field 'timestamp' must be a string or number")),
            None => return Err(invalid_payload("missing required field 'timestamp'")),
        };
        // Numeric timestamps are normalized so every variant sees a string.
        body.insert("timestamp".to_string(), Value::String(timestamp.clone()));

        let payload = match WebhookKind::from_type(&kind) {
            WebhookKind::MessageInbound => Self::MessageInbound(decode(&kind, body)?),
            WebhookKind::MessageSent => Self::MessageSent(decode(&kind, body)?),
            WebhookKind::MessageScheduled => Self::MessageScheduled(decode(&kind, body)?),
            WebhookKind::MessageFailed => Self::MessageFailed(decode(&kind, body)?),
            WebhookKind::MessageTimeout => Self::MessageTimeout(decode(&kind, body)?),
            WebhookKind::MessageReaction => Self::MessageReaction(decode(&kind, body)?),
            WebhookKind::GroupCreated => Self::GroupCreated(decode(&kind, body)?),
            WebhookKind::ConversationInited => Self::ConversationInited(decode(&kind, body)?),
            WebhookKind::Other => Self::Other {
                kind,
                timestamp,
                body,
            },
        };
        Ok(payload)
    }
}

fn decode<T: DeserializeOwned>(kind: &str, body: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| invalid_payload(format!("malformed '{kind}' webhook: {e}")))
}

fn invalid_payload(cause: impl Into<String>) -> ApiError {
    ApiError::new("Invalid webhook payload", crate::error::code::BAD_REQUEST).with_cause(cause)
}

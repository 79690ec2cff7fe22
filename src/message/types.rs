//! Request and response types for sending messages and auth requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Screen or bubble effect applied to an iMessage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageEffect {
    Slam,
    Loud,
    Gentle,
    InvisibleInk,
    Echo,
    Spotlight,
    Balloons,
    Confetti,
    Love,
    Lasers,
    Fireworks,
    ShootingStar,
    Celebration,
}

/// Tapback reaction, or the removal of one (`-love`, `-like`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    #[serde(rename = "love")]
    Love,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "dislike")]
    Dislike,
    #[serde(rename = "laugh")]
    Laugh,
    #[serde(rename = "exclaim")]
    Exclaim,
    #[serde(rename = "question")]
    Question,
    #[serde(rename = "-love")]
    RemoveLove,
    #[serde(rename = "-like")]
    RemoveLike,
    #[serde(rename = "-dislike")]
    RemoveDislike,
    #[serde(rename = "-laugh")]
    RemoveLaugh,
    #[serde(rename = "-exclaim")]
    RemoveExclaim,
    #[serde(rename = "-question")]
    RemoveQuestion,
}

/// Delivery channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    #[default]
    Imessage,
    Sms,
}

/// Parameters of a send-message request.
///
/// Exactly one of `recipient` or `group` must be set. Use
/// [`SendMessageParams::to_recipient`] or [`SendMessageParams::to_group`]
/// and the `with_*` methods to build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendMessageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub text: String,
    pub sender_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    /// Seconds the API waits for delivery before reporting `timeout`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_callback_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<MessageEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
    /// Target message of a reaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub audio_message: bool,
}

impl SendMessageParams {
    /// Creates a message addressed to a single recipient (phone or email).
    #[must_use]
    pub fn to_recipient(
        recipient: impl Into<String>,
        text: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            recipient: Some(recipient.into()),
            text: text.into(),
            sender_name: sender_name.into(),
            ..Self::default()
        }
    }

    /// Creates a message addressed to a group chat.
    #[must_use]
    pub fn to_group(
        group: impl Into<String>,
        text: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            group: Some(group.into()),
            text: text.into(),
            sender_name: sender_name.into(),
            ..Self::default()
        }
    }

    /// Adds an attachment URL.
    #[must_use]
    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachments.push(url.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_passthrough(mut self, passthrough: impl Into<String>) -> Self {
        self.passthrough = Some(passthrough.into());
        self
    }

    /// Sets the URL the API calls on status changes, and optionally the
    /// `Authorization` header value it sends along.
    #[must_use]
    pub fn with_status_callback(
        mut self,
        url: impl Into<String>,
        header: Option<String>,
    ) -> Self {
        self.status_callback = Some(url.into());
        self.status_callback_header = header;
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to_id = Some(message_id.into());
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub const fn with_effect(mut self, effect: MessageEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Sets a reaction to the message identified by `message_id`.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction, message_id: impl Into<String>) -> Self {
        self.reaction = Some(reaction);
        self.message_id = Some(message_id.into());
        self
    }

    #[must_use]
    pub const fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Marks the message as a voice message played from `media_url`.
    #[must_use]
    pub fn with_audio(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self.audio_message = true;
        self
    }

    /// Returns true when the message goes out over SMS.
    #[must_use]
    pub fn is_sms(&self) -> bool {
        self.service == Some(Service::Sms)
    }
}

/// Response to a successful send-message request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fields the API returned that this type does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters of an iMessage authorization request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthRequestParams {
    /// Opaque value echoed back in the auth webhook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<String>,
}

/// Response to an iMessage authorization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRequestResponse {
    pub request_id: String,
    /// Link the end user opens to start the authorization conversation.
    pub imessage_link: String,
    pub success: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_params_serialize_only_set_fields() {
        let params = SendMessageParams::to_recipient("+13231112233", "hi", "s@x.co");

        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(
            value,
            json!({"recipient": "+13231112233", "text": "hi", "sender_name": "s@x.co"})
        );
    }

    #[test]
    fn effect_and_reaction_use_wire_names() {
        let params = SendMessageParams::to_group("g1", "hi", "s@x.co")
            .with_effect(MessageEffect::InvisibleInk)
            .with_reaction(Reaction::RemoveLaugh, "m1");

        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["effect"], "invisibleInk");
        assert_eq!(value["reaction"], "-laugh");
        assert_eq!(value["message_id"], "m1");
    }

    #[test]
    fn audio_flag_is_serialized_when_set() {
        let params = SendMessageParams::to_recipient("+13231112233", "voice", "s@x.co")
            .with_audio("https://cdn.example.com/a.m4a")
            .with_service(Service::Imessage);

        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["audio_message"], true);
        assert_eq!(value["media_url"], "https://cdn.example.com/a.m4a");
        assert_eq!(value["service"], "imessage");
    }

    #[test]
    fn send_response_keeps_unknown_fields() {
        let response: SendMessageResponse = serde_json::from_value(json!({
            "message_id": "abc",
            "success": true,
            "recipient": "+13231112233",
            "text": "hi",
            "sandbox": true
        }))
        .unwrap();

        assert_eq!(response.message_id, "abc");
        assert_eq!(response.extra.get("sandbox"), Some(&json!(true)));
    }
}

//! Inbound webhooks: signature verification and typed payloads.

mod payload;
mod verifier;

#[cfg(test)]
mod verifier_tests;

pub use payload::{
    ConversationInited, DeliveryFailure, DeliveryUpdate, GroupCreated, GroupInfo, InboundMessage,
    ReactionReceived, WebhookKind, WebhookPayload,
};
pub use verifier::{SIGNATURE_PREFIX, WebhookVerifier};

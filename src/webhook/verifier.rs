//! HMAC-SHA256 verification of inbound webhooks.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookPayload;
use crate::config::{ConfigError, field};
use crate::error::{ApiError, code};
use crate::events::{Event, EventBus};

type HmacSha256 = Hmac<Sha256>;

/// Optional prefix accepted in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies webhook signatures and decodes verified payloads.
///
/// The signature is the lowercase hex HMAC-SHA256 of the raw request body,
/// keyed with the shared webhook secret. Verified payloads are published
/// on [`WebhookVerifier::events`] twice: once as [`Event::Webhook`] for
/// kind-scoped subscribers and once as [`Event::AnyWebhook`].
///
/// # Example
///
/// ```
/// use imessage_sdk::webhook::{WebhookKind, WebhookVerifier};
///
/// let verifier = WebhookVerifier::new("whsec").unwrap();
/// let body = br#"{"type":"message_sent","message_id":"m1","timestamp":"2024-05-01T10:00:00Z"}"#;
/// let signature = verifier.sign(body);
///
/// let payload = verifier.verify_and_parse(body, Some(&signature)).unwrap();
/// assert_eq!(payload.kind(), WebhookKind::MessageSent);
/// ```
pub struct WebhookVerifier {
    mac: HmacSha256,
    events: EventBus,
}

impl WebhookVerifier {
    /// Creates a verifier for `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        let missing =
            || ConfigError::missing(field::WEBHOOK_SECRET, "Webhook secret must not be empty");
        if secret.is_empty() {
            return Err(missing());
        }

        let mac = HmacSha256::new_from_slice(secret).map_err(|_| missing())?;
        Ok(Self {
            mac,
            events: EventBus::new(),
        })
    }

    /// Returns the bus that receives verified webhooks.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Computes the signature header value for `body`.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> String {
        hex::encode(self.digest(body))
    }

    /// Checks `signature` against the HMAC of `body`.
    ///
    /// # Errors
    ///
    /// - 400 "Missing webhook signature" when the header is absent or blank
    /// - 401 "Invalid webhook signature" when it does not match, including
    ///   values that are not hex or have the wrong length
    pub fn verify_signature(&self, body: &[u8], signature: Option<&str>) -> Result<(), ApiError> {
        let signature = signature.map(str::trim).unwrap_or_default();
        if signature.is_empty() {
            return Err(ApiError::new("Missing webhook signature", code::BAD_REQUEST)
                .with_cause("No signature header was provided"));
        }

        let hex_digest = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
        let matches = hex::decode(hex_digest)
            .is_ok_and(|provided| bool::from(provided.as_slice().ct_eq(&self.digest(body))));

        if !matches {
            tracing::warn!(body_len = body.len(), "Webhook signature mismatch");
            return Err(ApiError::new("Invalid webhook signature", code::UNAUTHORIZED)
                .with_cause("Signature does not match the request body"));
        }
        Ok(())
    }

    /// Verifies the signature, decodes the payload and publishes it.
    ///
    /// The signature is checked before the body is parsed, so tampered
    /// bodies fail with 401 even when they are not valid JSON.
    ///
    /// # Errors
    ///
    /// Signature errors from [`verify_signature`](Self::verify_signature),
    /// then the 400 errors of [`WebhookPayload::from_slice`].
    pub fn verify_and_parse(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookPayload, ApiError> {
        self.verify_signature(body, signature)?;
        let payload = WebhookPayload::from_slice(body)?;

        tracing::debug!(kind = %payload.kind(), timestamp = payload.timestamp(), "Webhook verified");
        self.events.publish(&Event::Webhook(payload.clone()));
        self.events.publish(&Event::AnyWebhook(payload.clone()));

        Ok(payload)
    }

    fn digest(&self, body: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("events", &self.events)
            .finish()
    }
}

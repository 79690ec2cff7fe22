//! iMessage SDK: a client for an iMessage/SMS messaging REST API.
//!
//! The crate sends messages, polls their delivery status and verifies
//! signed webhooks. Every failure is reported as an [`ApiError`] whose
//! `code` follows HTTP semantics.
//!
//! # Layers
//!
//! - [`MessagingClient`]: validated, high-level operations
//! - [`http::ApiClient`]: authenticated requests with retries
//! - [`status::StatusPoller`]: `wait_for_status`
//! - [`webhook::WebhookVerifier`]: HMAC-SHA256 signature checks
//! - [`events::EventBus`]: observer notifications from all of the above
//!
//! # Example
//!
//! ```no_run
//! use imessage_sdk::{Credentials, EventKind, MessagingClient, SendMessageParams};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MessagingClient::new(Credentials::new("auth-key", "secret-key")?)
//!     .with_webhook_secret("webhook-secret")?;
//!
//! client.subscribe(EventKind::Retry, |event| println!("{event:?}"));
//!
//! let params = SendMessageParams::to_recipient("+15551234567", "Hello!", "Support");
//! let response = client.send_message(&params).await?;
//! println!("queued {}", response.message_id);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod message;
pub mod retry;
pub mod status;
pub mod time;
pub mod webhook;

#[cfg(test)]
mod test_fixtures;

pub use client::MessagingClient;
pub use config::{ClientSettings, ConfigError, Credentials};
pub use error::ApiError;
pub use events::{Event, EventBus, EventKind, SubscriptionId};
pub use message::{
    AuthRequestParams, AuthRequestResponse, MessageEffect, Reaction, SendMessageParams,
    SendMessageResponse, Service,
};
pub use retry::RetryPolicy;
pub use status::{MessageStatus, StatusResponse, StatusTarget, WaitOptions};
pub use webhook::{WebhookKind, WebhookPayload};

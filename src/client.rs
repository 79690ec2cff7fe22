//! The high-level client most applications use.

use std::sync::Arc;

use crate::config::{ClientSettings, ConfigError, Credentials};
use crate::error::ApiError;
use crate::events::{Event, EventBus, EventKind, SubscriptionId};
use crate::http::{ApiClient, HttpClient, ReqwestClient};
use crate::message::{
    AuthRequestParams, AuthRequestResponse, MessageEffect, Reaction, SendMessageParams,
    SendMessageResponse, validate_auth_request, validate_send,
};
use crate::status::{StatusPoller, StatusResponse, StatusTarget, WaitOptions};
use crate::time::{Clock, Sleeper, TokioClock, TokioSleeper};
use crate::webhook::{WebhookPayload, WebhookVerifier};

/// Messaging API client.
///
/// Validates requests before any I/O, sends them through an [`ApiClient`],
/// waits on statuses with a [`StatusPoller`] and verifies webhooks with a
/// [`WebhookVerifier`]. Events from all three are republished on this
/// client's bus, see [`MessagingClient::subscribe`].
///
/// # Example
///
/// ```no_run
/// use imessage_sdk::{Credentials, MessagingClient, MessageStatus, SendMessageParams};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MessagingClient::new(Credentials::new("auth-key", "secret-key")?);
///
/// let sent = client
///     .send_message(&SendMessageParams::to_recipient("+15551234567", "Hello", "Support"))
///     .await?;
/// let status = client.wait_for_status(&sent.message_id, MessageStatus::Sent).await?;
/// println!("{} is {}", status.message_id, status.status);
/// # Ok(())
/// # }
/// ```
pub struct MessagingClient<H = ReqwestClient, S = TokioSleeper, C = TokioClock> {
    api: ApiClient<H, S>,
    poller: StatusPoller<S, C>,
    verifier: Option<WebhookVerifier>,
    wait_options: WaitOptions,
    events: Arc<EventBus>,
}

impl MessagingClient {
    /// Creates a client with production defaults.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::from_parts(ApiClient::new(credentials), StatusPoller::new(), None)
    }

    /// Creates a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook secret cannot be used.
    pub fn from_settings(settings: ClientSettings) -> Result<Self, ConfigError> {
        let api = ApiClient::new(settings.credentials).with_retry_policy(settings.retry_policy);
        let verifier = settings
            .webhook_secret
            .map(WebhookVerifier::new)
            .transpose()?;

        Ok(Self::from_parts(api, StatusPoller::new(), verifier)
            .with_wait_options(settings.wait_options))
    }
}

impl<H, S, C> MessagingClient<H, S, C>
where
    H: HttpClient,
    S: Sleeper,
    C: Clock,
{
    /// Assembles a client from its components and wires event forwarding.
    #[must_use]
    pub fn from_parts(
        api: ApiClient<H, S>,
        poller: StatusPoller<S, C>,
        verifier: Option<WebhookVerifier>,
    ) -> Self {
        let events = Arc::new(EventBus::new());
        forward(api.events(), &events);
        forward(poller.events(), &events);
        if let Some(verifier) = &verifier {
            forward(verifier.events(), &events);
        }

        Self {
            api,
            poller,
            verifier,
            wait_options: WaitOptions::default(),
            events,
        }
    }

    /// Enables webhook parsing with `secret`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if `secret` is empty.
    pub fn with_webhook_secret(mut self, secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let verifier = WebhookVerifier::new(secret)?;
        forward(verifier.events(), &self.events);
        self.verifier = Some(verifier);
        Ok(self)
    }

    /// Sets the options used by [`wait_for_status`](Self::wait_for_status).
    #[must_use]
    pub fn with_wait_options(mut self, options: WaitOptions) -> Self {
        self.wait_options = options;
        self
    }

    /// Returns the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient<H, S> {
        &self.api
    }

    /// Sends a message after validating it.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] without any I/O when validation fails,
    /// otherwise the classified API error.
    pub async fn send_message(
        &self,
        params: &SendMessageParams,
    ) -> Result<SendMessageResponse, ApiError> {
        validate_send(params)?;
        let response = self.api.send_message(params).await?;
        tracing::info!(message_id = %response.message_id, "Message accepted");
        Ok(response)
    }

    /// Sends a voice message; `params.media_url` must point at the audio.
    ///
    /// # Errors
    ///
    /// As [`send_message`](Self::send_message).
    pub async fn send_audio_message(
        &self,
        mut params: SendMessageParams,
    ) -> Result<SendMessageResponse, ApiError> {
        params.audio_message = true;
        self.send_message(&params).await
    }

    /// Sends a message with a screen or bubble effect.
    ///
    /// # Errors
    ///
    /// As [`send_message`](Self::send_message).
    pub async fn send_with_effect(
        &self,
        params: SendMessageParams,
        effect: MessageEffect,
    ) -> Result<SendMessageResponse, ApiError> {
        self.send_message(&params.with_effect(effect)).await
    }

    /// Reacts to the message identified by `message_id`.
    ///
    /// # Errors
    ///
    /// As [`send_message`](Self::send_message); a blank `message_id` is a 400.
    pub async fn send_reaction(
        &self,
        params: SendMessageParams,
        reaction: Reaction,
        message_id: &str,
    ) -> Result<SendMessageResponse, ApiError> {
        if message_id.trim().is_empty() {
            return Err(ApiError::bad_request("message_id is required for reactions"));
        }
        self.send_message(&params.with_reaction(reaction, message_id))
            .await
    }

    /// Replies in the thread of `reply_to_id`.
    ///
    /// # Errors
    ///
    /// As [`send_message`](Self::send_message); a blank `reply_to_id` is a 400.
    pub async fn send_reply(
        &self,
        params: SendMessageParams,
        reply_to_id: &str,
    ) -> Result<SendMessageResponse, ApiError> {
        if reply_to_id.trim().is_empty() {
            return Err(ApiError::bad_request("reply_to_id is required for replies"));
        }
        self.send_message(&params.with_reply_to(reply_to_id)).await
    }

    /// Starts an iMessage auth request.
    ///
    /// # Errors
    ///
    /// Returns a 400 without I/O for invalid parameters or a missing auth
    /// secret key, otherwise the classified API error.
    pub async fn initiate_auth_request(
        &self,
        params: &AuthRequestParams,
    ) -> Result<AuthRequestResponse, ApiError> {
        validate_auth_request(params)?;
        self.api.initiate_auth(params).await
    }

    /// Reads the current status of a message.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    pub async fn check_status(&self, message_id: &str) -> Result<StatusResponse, ApiError> {
        self.api.check_status(message_id).await
    }

    /// Waits for `message_id` to reach `target` using the client's
    /// [`WaitOptions`].
    ///
    /// # Errors
    ///
    /// See [`StatusPoller::wait_for_status`].
    pub async fn wait_for_status(
        &self,
        message_id: &str,
        target: impl Into<StatusTarget>,
    ) -> Result<StatusResponse, ApiError> {
        self.wait_for_status_with(message_id, target, &self.wait_options)
            .await
    }

    /// Waits for `message_id` to reach `target` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`StatusPoller::wait_for_status`].
    pub async fn wait_for_status_with(
        &self,
        message_id: &str,
        target: impl Into<StatusTarget>,
        options: &WaitOptions,
    ) -> Result<StatusResponse, ApiError> {
        self.poller
            .wait_for_status(&self.api, message_id, target, options)
            .await
    }

    /// Verifies and decodes a webhook request.
    ///
    /// # Errors
    ///
    /// Returns a 400 if no webhook secret is configured, otherwise the
    /// errors of [`WebhookVerifier::verify_and_parse`].
    pub fn parse_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookPayload, ApiError> {
        let verifier = self
            .verifier
            .as_ref()
            .ok_or_else(|| ApiError::bad_request("Webhook secret is not configured"))?;
        verifier.verify_and_parse(body, signature)
    }

    /// Subscribes to one kind of event from any component.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    /// Subscribes to every event from any component.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.subscribe_all(handler)
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Returns the client's event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

impl<H, S, C> std::fmt::Debug for MessagingClient<H, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingClient")
            .field("api", &self.api)
            .field("verifier", &self.verifier)
            .field("wait_options", &self.wait_options)
            .finish_non_exhaustive()
    }
}

fn forward(source: &EventBus, target: &Arc<EventBus>) {
    let target = Arc::clone(target);
    source.subscribe_all(move |event| target.publish(event));
}

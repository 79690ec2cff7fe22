//! Authenticated, retry-wrapped access to the messaging REST API.

use std::collections::BTreeSet;
use std::time::Duration;

use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::classify::{classify_response, classify_transport};
use super::{HttpClient, HttpRequest, ReqwestClient};
use crate::config::Credentials;
use crate::error::{ApiError, code};
use crate::events::{Event, EventBus, RequestRetry};
use crate::message::{AuthRequestParams, AuthRequestResponse, SendMessageParams, SendMessageResponse};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::status::StatusResponse;
use crate::time::{Sleeper, TokioSleeper};

/// Header carrying the secret key on message and status requests.
pub const SECRET_KEY_HEADER: &str = "loop-secret-key";

/// Header carrying the auth-request secret key.
pub const AUTH_SECRET_KEY_HEADER: &str = "loop-auth-secret-key";

/// Endpoint paths, joined onto the base URL without discarding its path.
pub mod paths {
    /// Send a message.
    pub const SEND_MESSAGE: &str = "api/v1/message/send/";
    /// Prefix of the status path; the message id and a trailing slash follow.
    pub const MESSAGE_STATUS: &str = "api/v1/message/status/";
    /// Start an auth request.
    pub const INITIATE_AUTH: &str = "api/v1/auth/initiate/";
}

/// Which family of endpoints a request targets.
///
/// The kind selects the secret header sent alongside `Authorization`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// Sending messages.
    Message,
    /// Reading message status.
    Status,
    /// Auth requests, signed with the auth secret key.
    Auth,
}

/// Per-call request options.
///
/// Unset overrides fall back to the client's [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Wrap the call in the retry engine. `false` makes exactly one attempt.
    pub retry: bool,
    /// Overrides `RetryPolicy::max_retries`.
    pub max_retries: Option<u32>,
    /// Overrides `RetryPolicy::base_delay`.
    pub base_delay: Option<Duration>,
    /// Overrides `RetryPolicy::non_retryable`.
    pub non_retryable: Option<BTreeSet<u16>>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            retry: true,
            max_retries: None,
            base_delay: None,
            non_retryable: None,
        }
    }
}

impl RequestConfig {
    /// Options for a single attempt with no retries.
    #[must_use]
    pub fn without_retry() -> Self {
        Self {
            retry: false,
            ..Self::default()
        }
    }

    /// Sets the retry count for this call.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the base delay for this call.
    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    /// Replaces the non-retryable codes for this call.
    #[must_use]
    pub fn with_non_retryable(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.non_retryable = Some(codes.into_iter().collect());
        self
    }

    fn resolve(&self, base: &RetryPolicy) -> RetryPolicy {
        let mut policy = base.clone();
        if let Some(max_retries) = self.max_retries {
            policy.max_retries = max_retries;
        }
        if let Some(delay) = self.base_delay {
            policy.base_delay = delay;
        }
        if let Some(codes) = &self.non_retryable {
            policy.non_retryable.clone_from(codes);
        }
        if !self.retry {
            policy.max_retries = 0;
        }
        policy
    }
}

/// Low-level API client.
///
/// Adds credential headers, classifies failures into [`ApiError`] and
/// retries retryable ones. Each retry is published as [`Event::Retry`] on
/// [`ApiClient::events`].
///
/// # Type Parameters
///
/// - `H`: HTTP transport
/// - `S`: Sleeper used between retries
pub struct ApiClient<H = ReqwestClient, S = TokioSleeper> {
    http: H,
    sleeper: S,
    credentials: Credentials,
    policy: RetryPolicy,
    events: EventBus,
}

impl ApiClient {
    /// Creates a client with the reqwest transport and production retries.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(ReqwestClient::new(), TokioSleeper, credentials)
    }
}

impl<H, S> ApiClient<H, S>
where
    H: HttpClient,
    S: Sleeper,
{
    /// Creates a client with a custom transport and sleeper.
    #[must_use]
    pub fn with_transport(http: H, sleeper: S, credentials: Credentials) -> Self {
        Self {
            http,
            sleeper,
            credentials,
            policy: RetryPolicy::production(),
            events: EventBus::new(),
        }
    }

    /// Sets the default retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the default retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the configured credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the bus that receives [`Event::Retry`].
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns a reference to the HTTP transport.
    #[must_use]
    pub const fn http_client(&self) -> &H {
        &self.http
    }

    /// Sends a GET request and decodes the JSON response.
    ///
    /// `path` is resolved under the base URL; a leading `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] once retries are exhausted or a
    /// non-retryable error occurs.
    pub async fn get<T>(
        &self,
        kind: EndpointKind,
        path: &str,
        config: &RequestConfig,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(path)?;
        self.execute(kind, Method::GET, url, None, config).await
    }

    /// Sends a POST request with a JSON body and decodes the JSON response.
    ///
    /// `path` is resolved under the base URL; a leading `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] once retries are exhausted or a
    /// non-retryable error occurs. A body that cannot be encoded is a 400.
    pub async fn post<B, T>(
        &self,
        kind: EndpointKind,
        path: &str,
        body: &B,
        config: &RequestConfig,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(path)?;
        let body = serde_json::to_vec(body)
            .map_err(|e| ApiError::bad_request(format!("Failed to encode request body: {e}")))?;
        self.execute(kind, Method::POST, url, Some(body), config).await
    }

    /// Sends a message. Parameters are sent as given; validation is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] on failure.
    pub async fn send_message(
        &self,
        params: &SendMessageParams,
    ) -> Result<SendMessageResponse, ApiError> {
        self.post(
            EndpointKind::Message,
            paths::SEND_MESSAGE,
            params,
            &RequestConfig::default(),
        )
        .await
    }

    /// Reads the current status of a message.
    ///
    /// # Errors
    ///
    /// Returns a 400 for a blank id, otherwise the classified [`ApiError`].
    pub async fn check_status(&self, message_id: &str) -> Result<StatusResponse, ApiError> {
        if message_id.trim().is_empty() {
            return Err(ApiError::bad_request("Message ID is required"));
        }

        let mut url = self.endpoint_url(paths::MESSAGE_STATUS)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::bad_request("Base URL cannot carry a path"))?
            .pop_if_empty()
            .push(message_id)
            .push("");

        self.execute(
            EndpointKind::Status,
            Method::GET,
            url,
            None,
            &RequestConfig::default(),
        )
        .await
    }

    /// Starts an auth request.
    ///
    /// # Errors
    ///
    /// Returns a 400 without any I/O if no auth secret key is configured,
    /// otherwise the classified [`ApiError`].
    pub async fn initiate_auth(
        &self,
        params: &AuthRequestParams,
    ) -> Result<AuthRequestResponse, ApiError> {
        self.post(
            EndpointKind::Auth,
            paths::INITIATE_AUTH,
            params,
            &RequestConfig::default(),
        )
        .await
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        self.credentials
            .base_url()
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::bad_request(format!("Invalid endpoint path '{path}': {e}")))
    }

    fn build_request(
        &self,
        kind: EndpointKind,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest, ApiError> {
        let (secret_header, secret) = match kind {
            EndpointKind::Message | EndpointKind::Status => {
                (SECRET_KEY_HEADER, self.credentials.secret_key())
            }
            EndpointKind::Auth => (
                AUTH_SECRET_KEY_HEADER,
                self.credentials.auth_secret_key().ok_or_else(|| {
                    ApiError::bad_request("Auth secret key is required for auth requests")
                })?,
            ),
        };

        let mut request = HttpRequest::new(method, url)
            .with_header(
                http::header::AUTHORIZATION,
                sensitive_value(self.credentials.authorization_key(), "Authorization")?,
            )
            .with_header(
                HeaderName::from_static(secret_header),
                sensitive_value(secret, secret_header)?,
            );

        if let Some(body) = body {
            request = request
                .with_header(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )
                .with_body(body);
        }

        Ok(request)
    }

    async fn execute<T>(
        &self,
        kind: EndpointKind,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        config: &RequestConfig,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.build_request(kind, method, url, body)?;
        let policy = config.resolve(&self.policy);
        let path = request.url.path().to_string();

        retry_with_backoff(
            &policy,
            &self.sleeper,
            |attempt| {
                self.events.publish(&Event::Retry(RequestRetry {
                    endpoint: kind,
                    path: path.clone(),
                    retry: attempt.clone(),
                }));
            },
            || self.send_once(kind, &request),
        )
        .await
    }

    async fn send_once<T>(&self, kind: EndpointKind, request: &HttpRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(
            method = %request.method,
            path = request.url.path(),
            endpoint = ?kind,
            "Sending API request"
        );

        let response = self.http.request(request.clone()).await.map_err(|e| {
            tracing::debug!(error = %e, "No response from API");
            classify_transport(&e)
        })?;

        tracing::debug!(status = response.status.as_u16(), "API response received");

        if !response.is_success() {
            return Err(classify_response(&response));
        }

        response.json().map_err(|e| {
            ApiError::new("Invalid response", code::INTERNAL).with_cause(e.to_string())
        })
    }
}

impl<H, S> std::fmt::Debug for ApiClient<H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &self.credentials)
            .field("policy", &self.policy)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

fn sensitive_value(value: &str, header: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| ApiError::bad_request(format!("Invalid characters in {header} value")))?;
    value.set_sensitive(true);
    Ok(value)
}

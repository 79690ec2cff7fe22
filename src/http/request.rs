//! Wire-level request and response values plus the [`HttpClient`] seam.

use serde::de::DeserializeOwned;

use super::HttpError;

/// One outgoing API call: method, absolute URL, headers and an encoded body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Verb for the call
    pub method: http::Method,
    /// Endpoint URL, already joined onto the base URL
    pub url: url::Url,
    /// Auth and content headers
    pub headers: http::HeaderMap,
    /// Encoded JSON payload, `None` for status reads
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Starts a call with empty headers and no payload.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` call.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Shorthand for a `POST` call.
    #[must_use]
    pub fn post(url: url::Url) -> Self {
        Self::new(http::Method::POST, url)
    }

    /// Attaches an already encoded payload.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header value. Repeated names accumulate.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// What the API sent back, read to the end.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status line code
    pub status: http::StatusCode,
    /// Headers as received
    pub headers: http::HeaderMap,
    /// Raw payload bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Builds a response from its parts.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the payload is not a `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport used by [`ApiClient`](super::ApiClient).
///
/// [`ReqwestClient`](super::ReqwestClient) is the production implementation;
/// tests script responses through their own impl.
///
/// ```ignore
/// use imessage_sdk::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
///
/// struct Canned(HttpResponse);
///
/// impl HttpClient for Canned {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Performs one round trip.
    ///
    /// 4xx and 5xx replies come back as `Ok`; classification happens upstream.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the server never answered.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

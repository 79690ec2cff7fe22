//! Classified error type shared by every operation in the crate.

use thiserror::Error;

/// Well-known error codes carried by [`ApiError`].
///
/// Codes mirror HTTP statuses so callers can match on them without
/// caring whether the failure originated locally or on the server.
pub mod code {
    /// Malformed request: invalid parameter, malformed webhook.
    pub const BAD_REQUEST: u16 = 400;
    /// Bad API credentials or webhook signature mismatch.
    pub const UNAUTHORIZED: u16 = 401;
    /// Credentials lack access to the resource.
    pub const FORBIDDEN: u16 = 403;
    /// Unknown resource (e.g. unknown message id).
    pub const NOT_FOUND: u16 = 404;
    /// A bounded wait ran out of time.
    pub const TIMEOUT: u16 = 408;
    /// The API is rate limiting this client.
    pub const RATE_LIMITED: u16 = 429;
    /// Server error or network failure.
    pub const INTERNAL: u16 = 500;
}

/// A classified failure.
///
/// Every public operation either resolves with typed data or fails with
/// this error. The `code` is an HTTP status (400/401/403/404/408/429/500)
/// or an API-supplied domain code; `cause` carries the underlying detail
/// when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code}){}", .cause.as_deref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct ApiError {
    message: String,
    code: u16,
    cause: Option<String>,
}

impl ApiError {
    /// Creates an error with the given message and code, without a cause.
    #[must_use]
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            cause: None,
        }
    }

    /// Attaches a cause to the error.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// A 400 "Invalid request" error, used for parameter validation.
    #[must_use]
    pub fn bad_request(cause: impl Into<String>) -> Self {
        Self::new("Invalid request", code::BAD_REQUEST).with_cause(cause)
    }

    /// A 401 "Authentication failed" error.
    #[must_use]
    pub fn unauthorized(cause: impl Into<String>) -> Self {
        Self::new("Authentication failed", code::UNAUTHORIZED).with_cause(cause)
    }

    /// A 408 error for a wait that exceeded its time budget.
    #[must_use]
    pub fn timeout(cause: impl Into<String>) -> Self {
        Self::new("Operation timed out", code::TIMEOUT).with_cause(cause)
    }

    /// A 500 error for a request that never produced a response.
    #[must_use]
    pub fn request_failed(cause: impl Into<String>) -> Self {
        Self::new("Request failed", code::INTERNAL).with_cause(cause)
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Numeric classification code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Underlying detail, if known.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Returns true for 401 and 403.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self.code, code::UNAUTHORIZED | code::FORBIDDEN)
    }
}

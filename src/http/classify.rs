//! Maps transport outcomes to classified [`ApiError`]s.
//!
//! Classification happens exactly once, at the HTTP boundary; the retry
//! engine and everything above it only ever see [`ApiError`].

use serde_json::Value;

use super::{HttpError, HttpResponse};
use crate::error::{ApiError, code};

/// Error body returned by the API: `{"message": "...", "code": 123}`.
///
/// Fields are read independently, so a malformed `code` never hides a
/// usable `message`.
#[derive(Debug, Default)]
struct ErrorBody {
    message: Option<String>,
    code: Option<u16>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let message = ["message", "error"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        // Codes outside u16, negative or non-numeric are dropped.
        let code = fields.get("code").and_then(|value| match value {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self { message, code }
    }
}

/// Classifies a non-2xx response.
///
/// - 404: "Resource not found", cause from the API message.
/// - 401/403: "Authentication failed", cause "Invalid API credentials"
///   regardless of what the server said.
/// - 400: "Invalid request", cause from the API message or a fallback.
/// - anything else: API code and message when present, else the HTTP
///   status and "API request failed".
#[must_use]
pub fn classify_response(response: &HttpResponse) -> ApiError {
    let status = response.status.as_u16();
    let body = ErrorBody::parse(&response.body);

    match status {
        code::NOT_FOUND => {
            let err = ApiError::new("Resource not found", code::NOT_FOUND);
            match body.message {
                Some(message) => err.with_cause(message),
                None => err,
            }
        }
        code::UNAUTHORIZED | code::FORBIDDEN => {
            ApiError::new("Authentication failed", status).with_cause("Invalid API credentials")
        }
        code::BAD_REQUEST => ApiError::bad_request(
            body.message
                .unwrap_or_else(|| "The request was rejected by the API".to_string()),
        ),
        _ => ApiError::new(
            body.message
                .unwrap_or_else(|| "API request failed".to_string()),
            body.code.unwrap_or(status),
        )
        .with_cause(format!("HTTP {}", response.status)),
    }
}

/// Classifies a request that produced no response at all.
#[must_use]
pub fn classify_transport(error: &HttpError) -> ApiError {
    ApiError::request_failed(error.to_string())
}

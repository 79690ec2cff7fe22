//! Transport-level failures: the request never produced an HTTP response.

use thiserror::Error;

/// Error type for the transport layer.
///
/// Only failures with no HTTP response end up here; a non-2xx status is a
/// response and is classified from its status and body instead.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection refused, DNS resolution failed, TLS handshake failed, etc.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The transport gave up waiting for the server.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad URL or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

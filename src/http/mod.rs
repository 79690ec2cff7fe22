//! HTTP layer: transport abstraction, error classification and the API client.
//!
//! - [`HttpClient`] is the transport seam; [`ReqwestClient`] is the
//!   production implementation.
//! - [`classify_response`] and [`classify_transport`] turn every failure
//!   into an [`ApiError`](crate::ApiError).
//! - [`ApiClient`] adds credentials and retries on top.

mod api;
mod classify;
mod error;
mod request;
mod reqwest_client;

#[cfg(test)]
mod api_tests;

pub use api::{
    AUTH_SECRET_KEY_HEADER, ApiClient, EndpointKind, RequestConfig, SECRET_KEY_HEADER, paths,
};
pub use classify::{classify_response, classify_transport};
pub use error::HttpError;
pub use request::{HttpClient, HttpRequest, HttpResponse};
pub use reqwest_client::ReqwestClient;

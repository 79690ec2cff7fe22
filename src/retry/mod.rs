//! Retry engine: exponential backoff with a retry ceiling and a set of
//! non-retryable error codes.
//!
//! - Policy configuration ([`RetryPolicy`])
//! - The retry loop ([`retry_with_backoff`], [`RetryAttempt`])

mod backoff;
mod policy;


pub use backoff::{RetryAttempt, retry_with_backoff};
pub use policy::RetryPolicy;

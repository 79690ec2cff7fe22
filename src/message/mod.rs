//! Message layer: outgoing request types and their validation.
//!
//! This module provides:
//! - Send-message parameters and response ([`SendMessageParams`], [`SendMessageResponse`])
//! - Effect, reaction and service enums ([`MessageEffect`], [`Reaction`], [`Service`])
//! - Auth request types ([`AuthRequestParams`], [`AuthRequestResponse`])
//! - Fail-fast validation ([`validate_send`], [`validate_auth_request`])

mod types;
pub mod validation;


pub use types::{
    AuthRequestParams, AuthRequestResponse, MessageEffect, Reaction, SendMessageParams,
    SendMessageResponse, Service,
};
pub use validation::{is_valid_recipient, validate_auth_request, validate_send};

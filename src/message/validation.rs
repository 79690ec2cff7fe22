//! Send-parameter validation.
//!
//! All checks run before any network call and fail with a 400
//! [`ApiError`] naming the offending field.

use std::sync::LazyLock;

use regex::Regex;

use super::{AuthRequestParams, SendMessageParams};
use crate::error::ApiError;

/// Bounds enforced on outgoing requests.
pub mod limits {
    /// Maximum message text length, in characters.
    pub const TEXT_MAX_CHARS: usize = 10_000;
    /// Maximum number of attachments per message.
    pub const ATTACHMENTS_MAX: usize = 3;
    /// Maximum length of any URL parameter.
    pub const URL_MAX_CHARS: usize = 256;
    /// Maximum passthrough length.
    pub const PASSTHROUGH_MAX_CHARS: usize = 1000;
    /// Maximum status-callback header length.
    pub const CALLBACK_HEADER_MAX_CHARS: usize = 256;
    /// Minimum delivery timeout, in seconds.
    pub const TIMEOUT_MIN_SECS: u32 = 5;
}

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{6,14}$").expect("phone pattern is valid"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Validates a send-message request.
///
/// # Errors
///
/// Returns a 400 [`ApiError`] describing the first violated rule.
pub fn validate_send(params: &SendMessageParams) -> Result<(), ApiError> {
    validate_target(params)?;
    validate_text(params)?;
    validate_attachments(params)?;
    validate_options(params)?;
    validate_reaction(params)?;
    validate_audio(params)?;
    if params.is_sms() {
        validate_sms(params)?;
    }
    Ok(())
}

/// Validates an auth request.
///
/// # Errors
///
/// Returns a 400 [`ApiError`] when the passthrough is too long.
pub fn validate_auth_request(params: &AuthRequestParams) -> Result<(), ApiError> {
    check_passthrough(params.passthrough.as_deref())
}

/// Returns true if `recipient` looks like a phone number or an email address.
///
/// Spaces, dashes and parentheses in phone numbers are ignored.
#[must_use]
pub fn is_valid_recipient(recipient: &str) -> bool {
    let trimmed = recipient.trim();
    if trimmed.contains('@') {
        return EMAIL.is_match(trimmed);
    }
    let compact: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    PHONE.is_match(&compact)
}

fn validate_target(params: &SendMessageParams) -> Result<(), ApiError> {
    let recipient = non_blank(params.recipient.as_deref());
    let group = non_blank(params.group.as_deref());

    match (recipient, group) {
        (Some(_), Some(_)) => Err(ApiError::bad_request(
            "recipient and group are mutually exclusive",
        )),
        (None, None) => Err(ApiError::bad_request("either recipient or group is required")),
        _ if is_blank(params.recipient.as_deref()) => Err(ApiError::bad_request(
            "recipient must be omitted rather than blank",
        )),
        _ if is_blank(params.group.as_deref()) => Err(ApiError::bad_request(
            "group must be omitted rather than blank",
        )),
        (Some(recipient), None) if !is_valid_recipient(recipient) => Err(ApiError::bad_request(
            format!("recipient '{recipient}' is not a phone number or email address"),
        )),
        _ => Ok(()),
    }
}

fn validate_text(params: &SendMessageParams) -> Result<(), ApiError> {
    if params.text.trim().is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    let len = params.text.chars().count();
    if len > limits::TEXT_MAX_CHARS {
        return Err(ApiError::bad_request(format!(
            "text is {len} characters, maximum is {}",
            limits::TEXT_MAX_CHARS
        )));
    }
    if params.sender_name.trim().is_empty() {
        return Err(ApiError::bad_request("sender_name is required"));
    }
    Ok(())
}

fn validate_attachments(params: &SendMessageParams) -> Result<(), ApiError> {
    if params.attachments.len() > limits::ATTACHMENTS_MAX {
        return Err(ApiError::bad_request(format!(
            "at most {} attachments are allowed",
            limits::ATTACHMENTS_MAX
        )));
    }
    params
        .attachments
        .iter()
        .try_for_each(|url| check_https_url("attachments", url))
}

fn validate_options(params: &SendMessageParams) -> Result<(), ApiError> {
    check_passthrough(params.passthrough.as_deref())?;

    if let Some(callback) = &params.status_callback {
        check_https_url("status_callback", callback)?;
    }
    if let Some(header) = &params.status_callback_header {
        if header.chars().count() > limits::CALLBACK_HEADER_MAX_CHARS {
            return Err(ApiError::bad_request(format!(
                "status_callback_header exceeds {} characters",
                limits::CALLBACK_HEADER_MAX_CHARS
            )));
        }
    }
    if let Some(timeout) = params.timeout {
        if timeout < limits::TIMEOUT_MIN_SECS {
            return Err(ApiError::bad_request(format!(
                "timeout must be at least {} seconds",
                limits::TIMEOUT_MIN_SECS
            )));
        }
    }
    if matches!(params.reply_to_id.as_deref(), Some(id) if id.trim().is_empty()) {
        return Err(ApiError::bad_request("reply_to_id must not be blank"));
    }
    Ok(())
}

fn validate_reaction(params: &SendMessageParams) -> Result<(), ApiError> {
    if params.effect.is_some() && params.reaction.is_some() {
        return Err(ApiError::bad_request(
            "effect and reaction are mutually exclusive",
        ));
    }
    if params.reaction.is_some() && non_blank(params.message_id.as_deref()).is_none() {
        return Err(ApiError::bad_request("reaction requires message_id"));
    }
    Ok(())
}

fn validate_audio(params: &SendMessageParams) -> Result<(), ApiError> {
    if !params.audio_message {
        return Ok(());
    }
    let Some(media_url) = non_blank(params.media_url.as_deref()) else {
        return Err(ApiError::bad_request("audio messages require media_url"));
    };
    check_https_url("media_url", media_url)?;
    if !params.attachments.is_empty() {
        return Err(ApiError::bad_request(
            "audio messages cannot carry attachments",
        ));
    }
    Ok(())
}

fn validate_sms(params: &SendMessageParams) -> Result<(), ApiError> {
    let unsupported = [
        (params.effect.is_some(), "effect"),
        (params.reaction.is_some(), "reaction"),
        (params.subject.is_some(), "subject"),
        (params.group.is_some(), "group"),
        (params.audio_message, "audio_message"),
    ];
    match unsupported.iter().find(|(set, _)| *set) {
        Some((_, field)) => Err(ApiError::bad_request(format!(
            "{field} is not supported for SMS"
        ))),
        None => Ok(()),
    }
}

fn check_passthrough(passthrough: Option<&str>) -> Result<(), ApiError> {
    match passthrough {
        Some(value) if value.chars().count() > limits::PASSTHROUGH_MAX_CHARS => {
            Err(ApiError::bad_request(format!(
                "passthrough exceeds {} characters",
                limits::PASSTHROUGH_MAX_CHARS
            )))
        }
        _ => Ok(()),
    }
}

fn check_https_url(field: &str, value: &str) -> Result<(), ApiError> {
    if value.chars().count() > limits::URL_MAX_CHARS {
        return Err(ApiError::bad_request(format!(
            "{field} URL exceeds {} characters",
            limits::URL_MAX_CHARS
        )));
    }
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "https" => Ok(()),
        _ => Err(ApiError::bad_request(format!(
            "{field} must be an https URL, got '{value}'"
        ))),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().is_empty())
}

//! API credentials and host selection.

use std::fmt;

use url::Url;

use super::defaults;
use super::error::{ConfigError, field};

/// Keys sent with every API request.
///
/// `authorization_key` and `secret_key` are required for message and status
/// endpoints. `auth_secret_key` is only needed for auth requests; calling
/// those endpoints without it fails before any I/O.
///
/// The `Debug` output never includes key material.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    authorization_key: String,
    secret_key: String,
    auth_secret_key: Option<String>,
    base_url: Url,
}

impl Credentials {
    /// Creates credentials for the production host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when either key is blank.
    pub fn new(
        authorization_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let authorization_key = required(
            authorization_key.into(),
            field::AUTHORIZATION_KEY,
            "Provide the authorization key from the API dashboard",
        )?;
        let secret_key = required(
            secret_key.into(),
            field::SECRET_KEY,
            "Provide the API secret key from the API dashboard",
        )?;

        let base_url = parse_base_url(defaults::BASE_URL)?;

        Ok(Self {
            authorization_key,
            secret_key,
            auth_secret_key: None,
            base_url,
        })
    }

    /// Adds the secret used by auth-request endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when the key is blank.
    pub fn with_auth_secret_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        self.auth_secret_key = Some(required(
            key.into(),
            field::AUTH_SECRET_KEY,
            "Provide the auth-request secret key or omit it",
        )?);
        Ok(self)
    }

    /// Points the client at a different host (sandbox, proxy, test server).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when the URL does not parse or is
    /// not http(s).
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    /// The `Authorization` header value.
    #[must_use]
    pub fn authorization_key(&self) -> &str {
        &self.authorization_key
    }

    /// The `Loop-Secret-Key` header value.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// The `Loop-Auth-Secret-Key` header value, if configured.
    #[must_use]
    pub fn auth_secret_key(&self) -> Option<&str> {
        self.auth_secret_key.as_deref()
    }

    /// Host that endpoint paths are joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("authorization_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field(
                "auth_secret_key",
                &self.auth_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn required(
    value: String,
    field: &'static str,
    hint: &'static str,
) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing(field, hint));
    }
    Ok(value)
}

pub(super) fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "URL scheme must be http or https".to_string(),
        });
    }
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }

    // Endpoint paths are joined relative to the base, so a mount prefix
    // such as `/loop` must end in a slash to be kept.
    let mut parsed = parsed;
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

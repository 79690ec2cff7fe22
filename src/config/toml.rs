//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional here; [`ClientSettings`](super::ClientSettings)
/// decides which ones are required.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// API credentials and host
    #[serde(default)]
    pub api: ApiSection,

    /// Webhook verification
    #[serde(default)]
    pub webhook: WebhookSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,

    /// Status polling defaults
    #[serde(default)]
    pub wait: WaitSection,
}

/// API credentials section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// Value of the `Authorization` header
    pub authorization_key: Option<String>,

    /// Value of the `Loop-Secret-Key` header
    pub secret_key: Option<String>,

    /// Value of the `Loop-Auth-Secret-Key` header
    pub auth_secret_key: Option<String>,

    /// Override for the API host
    pub base_url: Option<String>,
}

/// Webhook configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Shared HMAC secret for signature checks
    pub secret: Option<String>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Starting preset: "production" (default), "test" or "none"
    pub preset: Option<String>,

    /// Retries after the initial attempt
    pub max_retries: Option<u32>,

    /// Delay before the first retry in milliseconds
    pub base_delay_ms: Option<u64>,

    /// Error codes that are never retried
    pub non_retryable: Option<Vec<u16>>,
}

/// Status polling section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSection {
    /// Status checks before the final best-effort read
    pub max_attempts: Option<u32>,

    /// Delay between checks in milliseconds
    pub delay_ms: Option<u64>,

    /// Overall timeout in milliseconds, 0 disables it
    pub timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# iMessage SDK client configuration

[api]
# Authorization key (required)
# authorization_key = "your-authorization-key"

# API secret key (required)
# secret_key = "your-secret-key"

# Secret key for auth requests (only needed for initiate_auth_request)
# auth_secret_key = "your-auth-secret-key"

# API host (default: https://server.loopmessage.com)
# base_url = "https://server.loopmessage.com"

[webhook]
# Shared secret used to verify webhook signatures
# secret = "your-webhook-secret"

[retry]
# Starting preset: "production" (5 retries, 500ms), "test" (3 retries, 100ms) or "none"
# preset = "production"

# Retries after the initial attempt
# max_retries = 5

# Delay before the first retry in milliseconds, doubled on each retry
# base_delay_ms = 500

# Error codes returned without retrying
# non_retryable = [400, 401, 403, 404]

[wait]
# Status checks before the final best-effort read (default: 10)
# max_attempts = 10

# Delay between status checks in milliseconds (default: 2000)
# delay_ms = 2000

# Overall timeout in milliseconds, 0 disables it (default: 30000)
# timeout_ms = 30000
"#
    .to_string()
}

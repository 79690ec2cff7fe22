//! Validated client settings built from a TOML file.
//!
//! All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::status::WaitOptions;

use super::credentials::Credentials;
use super::error::{ConfigError, field};
use super::toml::{RetrySection, TomlConfig, WaitSection};

/// Fully validated configuration ready to build a client.
///
/// Use [`ClientSettings::load`] for a file on disk or
/// [`ClientSettings::from_toml`] for an already parsed config.
#[derive(Clone)]
pub struct ClientSettings {
    /// API keys and host
    pub credentials: Credentials,

    /// Webhook signing secret, if webhooks are verified
    pub webhook_secret: Option<String>,

    /// Retry policy for API requests
    pub retry_policy: RetryPolicy,

    /// Defaults for `wait_for_status`
    pub wait_options: WaitOptions,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("credentials", &self.credentials)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("retry_policy", &self.retry_policy)
            .field("wait_options", &self.wait_options)
            .finish()
    }
}

impl fmt::Display for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings {{ base_url: {}, auth_secret: {}, webhook_secret: {}, \
             retry: {}x/{}ms, wait: {}x/{}ms/{}ms }}",
            self.credentials.base_url(),
            if self.credentials.auth_secret_key().is_some() { "set" } else { "unset" },
            if self.webhook_secret.is_some() { "set" } else { "unset" },
            self.retry_policy.max_retries,
            self.retry_policy.base_delay.as_millis(),
            self.wait_options.max_attempts,
            self.wait_options.delay.as_millis(),
            self.wait_options.timeout.as_millis(),
        )
    }
}

impl ClientSettings {
    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml = TomlConfig::load(path)?;
        Self::from_toml(&toml)
    }

    /// Validates a parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required keys are missing or blank
    /// - The base URL is invalid
    /// - The retry preset is unknown
    /// - `wait.max_attempts` or `wait.delay_ms` is zero
    pub fn from_toml(toml: &TomlConfig) -> Result<Self, ConfigError> {
        let credentials = Self::build_credentials(toml)?;
        let webhook_secret = Self::resolve_webhook_secret(toml)?;
        let retry_policy = Self::build_retry_policy(&toml.retry)?;
        let wait_options = Self::build_wait_options(&toml.wait)?;

        Ok(Self {
            credentials,
            webhook_secret,
            retry_policy,
            wait_options,
        })
    }

    fn build_credentials(toml: &TomlConfig) -> Result<Credentials, ConfigError> {
        let api = &toml.api;
        let authorization_key = api.authorization_key.clone().ok_or_else(|| {
            ConfigError::missing(
                field::AUTHORIZATION_KEY,
                "Set authorization_key in the [api] section",
            )
        })?;
        let secret_key = api.secret_key.clone().ok_or_else(|| {
            ConfigError::missing(field::SECRET_KEY, "Set secret_key in the [api] section")
        })?;

        let mut credentials = Credentials::new(authorization_key, secret_key)?;
        if let Some(key) = &api.auth_secret_key {
            credentials = credentials.with_auth_secret_key(key.clone())?;
        }
        if let Some(url) = &api.base_url {
            credentials = credentials.with_base_url(url)?;
        }
        Ok(credentials)
    }

    fn resolve_webhook_secret(toml: &TomlConfig) -> Result<Option<String>, ConfigError> {
        match &toml.webhook.secret {
            Some(secret) if secret.is_empty() => Err(ConfigError::missing(
                field::WEBHOOK_SECRET,
                "Remove the key or set a non-empty secret",
            )),
            other => Ok(other.clone()),
        }
    }

    fn build_retry_policy(section: &RetrySection) -> Result<RetryPolicy, ConfigError> {
        let mut policy = match section.preset.as_deref() {
            None | Some("production") => RetryPolicy::production(),
            Some("test") => RetryPolicy::for_tests(),
            Some("none") => RetryPolicy::no_retry(),
            Some(other) => {
                return Err(ConfigError::InvalidRetry(format!(
                    "unknown preset '{other}', expected production, test or none"
                )));
            }
        };

        if let Some(max_retries) = section.max_retries {
            policy = policy.with_max_retries(max_retries);
        }
        if let Some(ms) = section.base_delay_ms {
            policy = policy.with_base_delay(Duration::from_millis(ms));
        }
        if let Some(codes) = &section.non_retryable {
            policy = policy.with_non_retryable(codes.iter().copied());
        }

        Ok(policy)
    }

    fn build_wait_options(section: &WaitSection) -> Result<WaitOptions, ConfigError> {
        let mut options = WaitOptions::default();

        if let Some(max_attempts) = section.max_attempts {
            if max_attempts == 0 {
                return Err(ConfigError::InvalidDuration {
                    field: "wait.max_attempts",
                    reason: "must be at least 1".to_string(),
                });
            }
            options = options.with_max_attempts(max_attempts);
        }
        if let Some(ms) = section.delay_ms {
            if ms == 0 {
                return Err(ConfigError::InvalidDuration {
                    field: "wait.delay_ms",
                    reason: "must be greater than zero".to_string(),
                });
            }
            options = options.with_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = section.timeout_ms {
            options = options.with_timeout(Duration::from_millis(ms));
        }

        Ok(options)
    }
}

//! Tests for `ClientSettings` validation.

use std::io::Write;
use std::time::Duration;

use super::{ClientSettings, ConfigError, TomlConfig};
use crate::retry::RetryPolicy;
use crate::status::WaitOptions;

const MINIMAL: &str = r#"
    [api]
    authorization_key = "auth"
    secret_key = "secret"
"#;

fn settings(toml: &str) -> Result<ClientSettings, ConfigError> {
    ClientSettings::from_toml(&TomlConfig::parse(toml).unwrap())
}

mod required_fields {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let settings = settings(MINIMAL).unwrap();

        assert_eq!(settings.credentials.authorization_key(), "auth");
        assert_eq!(settings.credentials.secret_key(), "secret");
        assert!(settings.webhook_secret.is_none());
        assert_eq!(settings.retry_policy, RetryPolicy::production());
        assert_eq!(settings.wait_options, WaitOptions::default());
    }

    #[test]
    fn missing_authorization_key_fails() {
        let err = settings("[api]\nsecret_key = \"secret\"\n").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingRequired { field: "api.authorization_key", .. }
        ));
    }

    #[test]
    fn missing_secret_key_fails() {
        let err = settings("[api]\nauthorization_key = \"auth\"\n").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingRequired { field: "api.secret_key", .. }
        ));
    }

    #[test]
    fn empty_webhook_secret_fails() {
        let toml = format!("{MINIMAL}\n[webhook]\nsecret = \"\"\n");

        let err = settings(&toml).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingRequired { field: "webhook.secret", .. }
        ));
    }
}

mod retry {
    use super::*;

    #[test]
    fn preset_then_overrides() {
        let toml = format!(
            "{MINIMAL}\n[retry]\npreset = \"test\"\nbase_delay_ms = 40\nnon_retryable = [400]\n"
        );

        let policy = settings(&toml).unwrap().retry_policy;

        assert_eq!(policy.max_retries, RetryPolicy::TEST_MAX_RETRIES);
        assert_eq!(policy.base_delay, Duration::from_millis(40));
        assert_eq!(policy.non_retryable.into_iter().collect::<Vec<_>>(), vec![400]);
    }

    #[test]
    fn none_preset_disables_retries() {
        let toml = format!("{MINIMAL}\n[retry]\npreset = \"none\"\n");

        assert_eq!(settings(&toml).unwrap().retry_policy.max_retries, 0);
    }

    #[test]
    fn unknown_preset_fails() {
        let toml = format!("{MINIMAL}\n[retry]\npreset = \"aggressive\"\n");

        assert!(matches!(settings(&toml), Err(ConfigError::InvalidRetry(_))));
    }
}

mod wait {
    use super::*;

    #[test]
    fn overrides_are_applied() {
        let toml = format!("{MINIMAL}\n[wait]\nmax_attempts = 3\ndelay_ms = 100\ntimeout_ms = 0\n");

        let options = settings(&toml).unwrap().wait_options;

        assert_eq!(options.max_attempts, 3);
        assert_eq!(options.delay, Duration::from_millis(100));
        assert_eq!(options.timeout, Duration::ZERO);
    }

    #[test]
    fn zero_attempts_fails() {
        let toml = format!("{MINIMAL}\n[wait]\nmax_attempts = 0\n");

        assert!(matches!(
            settings(&toml),
            Err(ConfigError::InvalidDuration { field: "wait.max_attempts", .. })
        ));
    }

    #[test]
    fn zero_delay_fails() {
        let toml = format!("{MINIMAL}\n[wait]\ndelay_ms = 0\n");

        assert!(matches!(
            settings(&toml),
            Err(ConfigError::InvalidDuration { field: "wait.delay_ms", .. })
        ));
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{MINIMAL}\nauth_secret_key = \"auth-secret\"\nbase_url = \"http://localhost:3000\"\n\n[webhook]\nsecret = \"whsec\""
        )
        .unwrap();

        let settings = ClientSettings::load(file.path()).unwrap();

        assert_eq!(settings.credentials.auth_secret_key(), Some("auth-secret"));
        assert_eq!(settings.credentials.base_url().as_str(), "http://localhost:3000/");
        assert_eq!(settings.webhook_secret.as_deref(), Some("whsec"));
    }

    #[test]
    fn invalid_base_url_fails() {
        let toml = format!("{MINIMAL}\nbase_url = \"not a url\"\n");

        assert!(matches!(settings(&toml), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn display_does_not_leak_secrets() {
        let toml = format!("{MINIMAL}\n[webhook]\nsecret = \"whsec-value\"\n");

        let shown = settings(&toml).unwrap().to_string();

        assert!(!shown.contains("whsec-value"));
        assert!(shown.contains("webhook_secret: set"));
    }
}

#[test]
fn debug_redacts_webhook_secret() {
    let toml = format!("{MINIMAL}\n[webhook]\nsecret = \"whsec-value\"\n");

    let debug = format!("{:?}", settings(&toml).unwrap());

    assert!(!debug.contains("whsec-value"));
    assert!(!debug.contains("\"secret\""));
}

//! Configuration layer.
//!
//! This module provides:
//! - API credentials ([`Credentials`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated settings ([`ClientSettings`])
//! - Default values ([`defaults`])
//!
//! Credentials can be built directly in code; the TOML layer exists for
//! applications that keep keys and tuning in a file. Values missing from the
//! file fall back to the built-in defaults.

mod credentials;
pub mod defaults;
mod error;
mod settings;
mod toml;

#[cfg(test)]
mod settings_tests;

pub use credentials::Credentials;
pub use error::{ConfigError, field};
pub use settings::ClientSettings;
pub use toml::{ApiSection, RetrySection, TomlConfig, WaitSection, WebhookSection, default_config_template};

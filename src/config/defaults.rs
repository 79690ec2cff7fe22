//! Default values for client configuration.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Production API host.
pub const BASE_URL: &str = "https://server.loopmessage.com";

/// Default number of status checks before the final best-effort read.
pub const WAIT_MAX_ATTEMPTS: u32 = 10;

/// Default delay between status checks in milliseconds.
pub const WAIT_DELAY_MS: u64 = 2000;

/// Default wait timeout in milliseconds (0 disables the timeout).
pub const WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default delay between status checks.
#[must_use]
pub const fn wait_delay() -> Duration {
    Duration::from_millis(WAIT_DELAY_MS)
}

/// Default wait timeout.
#[must_use]
pub const fn wait_timeout() -> Duration {
    Duration::from_millis(WAIT_TIMEOUT_MS)
}

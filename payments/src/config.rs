//! Configuration for the payments client.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::poller::PollOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default payments API base URL (local Django backend)
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/payments";

/// Payments configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// Base URL of the payments API, without trailing slash
    pub api_base: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
    /// Status poll settings
    pub poll: PollConfig,
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of status checks per session
    pub max_attempts: u32,
    /// Milliseconds between checks
    pub interval_ms: u64,
    /// Milliseconds before the first check
    pub initial_delay_ms: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        let poll = PollOptions::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: None,
            http_timeout_secs: 10,
            poll: PollConfig {
                max_attempts: poll.max_attempts,
                interval_ms: duration_ms(poll.interval),
                initial_delay_ms: duration_ms(poll.initial_delay),
            },
        }
    }
}

impl PaymentsConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults, as do zero
    /// attempt counts and zero timeouts.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any `TRAILS_*` variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |name: &str| lookup(name).and_then(|value| value.trim().parse::<u64>().ok());
        let positive = |name: &str| parse(name).filter(|value| *value > 0);

        Self {
            api_base: lookup("TRAILS_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            api_token: lookup("TRAILS_API_TOKEN").filter(|token| !token.is_empty()),
            http_timeout_secs: positive("TRAILS_HTTP_TIMEOUT_SECS")
                .unwrap_or(defaults.http_timeout_secs),
            poll: PollConfig {
                max_attempts: positive("TRAILS_POLL_MAX_ATTEMPTS")
                    .and_then(|value| u32::try_from(value).ok())
                    .unwrap_or(defaults.poll.max_attempts),
                interval_ms: parse("TRAILS_POLL_INTERVAL_MS").unwrap_or(defaults.poll.interval_ms),
                initial_delay_ms: parse("TRAILS_POLL_INITIAL_DELAY_MS")
                    .unwrap_or(defaults.poll.initial_delay_ms),
            },
        }
    }

    /// HTTP request timeout
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Poll options derived from this configuration
    #[must_use]
    pub const fn poll_options(&self) -> PollOptions {
        PollOptions {
            max_attempts: self.poll.max_attempts,
            interval: Duration::from_millis(self.poll.interval_ms),
            initial_delay: Duration::from_millis(self.poll.initial_delay_ms),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

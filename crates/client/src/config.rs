//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and timing settings for the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the chat service, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Per-request timeout in milliseconds (native targets only)
    pub request_timeout_ms: Option<u64>,
    /// Period of the chat message refresh
    pub poll_interval_ms: u64,
    /// Delay before sending the user to the login view after a failed validation
    pub login_redirect_delay_ms: u64,
    pub user_agent: String,
}

impl ClientConfig {
    /// Chat refresh period used when nothing else is configured
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

    /// Login redirect delay used when nothing else is configured
    pub const DEFAULT_LOGIN_REDIRECT_DELAY_MS: u64 = 2_000;

    /// Create a configuration pointing at `base_url` with default timings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: Some(30_000),
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            login_redirect_delay_ms: Self::DEFAULT_LOGIN_REDIRECT_DELAY_MS,
            user_agent: concat!("parlor-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

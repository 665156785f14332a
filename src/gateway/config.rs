//! Connection settings for the remote order-processing service

use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Where the gateway sends requests and how long it waits for them
///
/// A call that exceeds `timeout` is treated exactly like a network failure.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Upper bound for every remote call
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl GatewayConfig {
    /// Create a GatewayConfig with custom values
    ///
    /// An empty URL or a zero timeout falls back to the default with a warning.
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        let default = Self::default();

        let base_url = base_url.trim().trim_end_matches('/');
        let base_url = if base_url.is_empty() {
            warn!(
                "Invalid base_url (empty), using default ({})",
                default.base_url
            );
            default.base_url
        } else {
            base_url.to_string()
        };

        let timeout = if timeout_ms == 0 {
            warn!(
                "Invalid timeout_ms ({}), using default ({})",
                timeout_ms, DEFAULT_TIMEOUT_MS
            );
            default.timeout
        } else {
            Duration::from_millis(timeout_ms)
        };

        Self { base_url, timeout }
    }

    /// Absolute URL for an endpoint path such as `/api/redemptions`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

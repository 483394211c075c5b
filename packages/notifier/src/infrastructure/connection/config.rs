//! Connection settings.

use std::time::Duration;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/notifications";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Settings for the WebSocket connection to the notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// WebSocket URL of the notification service
    pub url: String,
    /// Consecutive failed connection attempts before giving up
    pub max_reconnect_attempts: u32,
    /// Wait between connection attempts
    pub reconnect_interval: Duration,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: Duration::from_secs(DEFAULT_RECONNECT_INTERVAL_SECS),
        }
    }
}

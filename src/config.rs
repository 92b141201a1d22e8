//! Configuration management for the dashboard client

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 4_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SESSION_FILE: &str = ".sentinel-session.json";

/// Dashboard client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `https://sentinel.example.com`
    pub base_url: String,

    /// Status poll period
    pub poll_interval_ms: u64,

    /// How long a toast stays on screen
    pub notification_ttl_ms: u64,

    /// Per-request timeout applied by the HTTP transport
    pub request_timeout_ms: u64,

    /// Durable session storage (token + username)
    pub session_path: PathBuf,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            session_path: PathBuf::from(DEFAULT_SESSION_FILE),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: lookup("SENTINEL_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),

            poll_interval_ms: lookup("SENTINEL_POLL_INTERVAL_MS")
                .map(|v| v.parse().unwrap_or(DEFAULT_POLL_INTERVAL_MS))
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),

            notification_ttl_ms: lookup("SENTINEL_NOTIFICATION_TTL_MS")
                .map(|v| v.parse().unwrap_or(DEFAULT_NOTIFICATION_TTL_MS))
                .unwrap_or(DEFAULT_NOTIFICATION_TTL_MS),

            request_timeout_ms: lookup("SENTINEL_REQUEST_TIMEOUT_MS")
                .map(|v| v.parse().unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),

            session_path: lookup("SENTINEL_SESSION_FILE")
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from),

            log_level: lookup("SENTINEL_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(DashboardError::Config("base_url must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::Config("poll_interval_ms must be positive".into()));
        }
        if self.notification_ttl_ms == 0 {
            return Err(DashboardError::Config("notification_ttl_ms must be positive".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(DashboardError::Config("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert_eq!(config.notification_ttl(), Duration::from_millis(4000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides_and_fallbacks() {
        let config = Config::from_lookup(lookup_from(&[
            ("SENTINEL_API_URL", "https://bot.example.com/"),
            ("SENTINEL_POLL_INTERVAL_MS", "1500"),
            ("SENTINEL_NOTIFICATION_TTL_MS", "soon"),
            ("SENTINEL_SESSION_FILE", "/tmp/session.json"),
        ]));
        assert_eq!(config.base_url, "https://bot.example.com");
        assert_eq!(config.poll_interval_ms, 1500);
        assert_eq!(config.notification_ttl_ms, DEFAULT_NOTIFICATION_TTL_MS);
        assert_eq!(config.session_path, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.base_url = "ftp://nowhere".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}

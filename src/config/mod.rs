use serde::Deserialize;
use std::time::Duration;

use crate::services::poller::WatchOptions;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of a running tracker, used by `job-watch`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Delay between status queries of a watch session.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum duration of a watch session. 0 disables the deadline.
    #[serde(default = "default_watch_timeout_ms")]
    pub watch_timeout_ms: u64,

    /// Per-request timeout of the HTTP client.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_watch_timeout_ms() -> u64 {
    600_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn watch_options(&self) -> WatchOptions {
        let options = WatchOptions::new(Duration::from_millis(self.poll_interval_ms));
        match self.watch_timeout_ms {
            0 => options,
            ms => options.with_timeout(Duration::from_millis(ms)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AppConfig = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.poll_interval_ms, 5_000);
        assert_eq!(
            config.watch_options(),
            WatchOptions::new(Duration::from_secs(5)).with_timeout(Duration::from_secs(600))
        );
    }

    #[test]
    fn test_env_overrides() {
        let vars = vec![
            ("POLL_INTERVAL_MS".to_string(), "250".to_string()),
            ("WATCH_TIMEOUT_MS".to_string(), "0".to_string()),
            ("API_BASE_URL".to_string(), "http://tracker:8080".to_string()),
        ];
        let config: AppConfig = envy::from_iter(vars).unwrap();
        assert_eq!(config.api_base_url, "http://tracker:8080");
        assert_eq!(config.watch_options(), WatchOptions::new(Duration::from_millis(250)));
    }
}

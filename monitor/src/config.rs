use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl MonitorConfig {
    /// Load config from a specific .env file, or the default `.env` if None.
    pub fn from_env_file(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                dotenvy::from_filename(p)
                    .with_context(|| format!("Failed to load config file {p}"))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::build(|key| std::env::var(key).ok())
    }

    fn build(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cfg = Self {
            base_url: env("MONITOR_BASE_URL", DEFAULT_BASE_URL),
            poll_interval_ms: env_millis(
                "MONITOR_POLL_INTERVAL_MS",
                &env("MONITOR_POLL_INTERVAL_MS", &DEFAULT_POLL_INTERVAL_MS.to_string()),
            )?,
            request_timeout_ms: env_millis(
                "MONITOR_REQUEST_TIMEOUT_MS",
                &env("MONITOR_REQUEST_TIMEOUT_MS", &DEFAULT_REQUEST_TIMEOUT_MS.to_string()),
            )?,
        };
        cfg.normalized()
    }

    /// Apply command-line overrides on top of file/env values.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        poll_interval_ms: Option<u64>,
        request_timeout_ms: Option<u64>,
    ) -> Result<Self> {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(ms) = poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = request_timeout_ms {
            self.request_timeout_ms = ms;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("Base URL must not be empty");
        }
        self.base_url = trimmed.to_string();

        if self.poll_interval_ms == 0 {
            bail!("Poll interval must be greater than 0 ms");
        }
        if self.request_timeout_ms == 0 {
            bail!("Request timeout must be greater than 0 ms");
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn env_millis(key: &str, val: &str) -> Result<u64> {
    val.trim()
        .parse()
        .with_context(|| format!("Invalid millisecond value for {key}: {val}"))
}

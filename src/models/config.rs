//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream scrape service settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Configuration for the Lambda environment: defaults overridden by
    /// environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.http.timeout_secs = secs;
            }
        }

        if let Ok(concurrent) = std::env::var("MAX_CONCURRENT") {
            if let Ok(n) = concurrent.parse() {
                config.http.max_concurrent = n;
            }
        }

        if let Ok(agent) = std::env::var("HTTP_USER_AGENT") {
            if !agent.trim().is_empty() {
                config.http.user_agent = agent;
            }
        }

        if let Ok(url) = std::env::var("UPSTREAM_SCRAPER_URL") {
            if !url.trim().is_empty() {
                config.upstream.url = Some(url);
            }
        }

        config
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::config("http.max_concurrent must be > 0"));
        }
        if let Some(url) = &self.upstream.url {
            url::Url::parse(url)
                .map_err(|e| AppError::config(format!("upstream.url is invalid: {e}")))?;
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent board fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Upstream jobspy-compatible scrape service settings.
///
/// Scraper-backed boards (Indeed, LinkedIn, …) are delegated to this
/// service; requesting one with no URL configured fails that source at
/// fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the scrape service (e.g. "http://scraper.internal:8000")
    #[serde(default)]
    pub url: Option<String>,

    /// Request path on the scrape service
    #[serde(default = "defaults::upstream_path")]
    pub path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: defaults::upstream_path(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobfan/2.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn upstream_path() -> String {
        "/scrape".into()
    }
}

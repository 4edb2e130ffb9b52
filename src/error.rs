// src/error.rs

//! Unified error handling for the job search API.

use std::fmt;

use thiserror::Error;

/// Result type alias for jobfan operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Request parameter rejected during validation
    #[error("{0}")]
    InvalidParam(String),

    /// The upstream scrape service returned a non-success status
    #[error("Upstream scraper returned {status} for {sites}: {message}")]
    Upstream {
        sites: String,
        status: u16,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetching a single board failed
    #[error("Fetch error for {site}: {message}")]
    Fetch { site: String, message: String },
}

impl AppError {
    /// Create a parameter validation error.
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidParam(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a board fetch error with context.
    pub fn fetch(site: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            site: site.into(),
            message: message.to_string(),
        }
    }

    /// Create an upstream error carrying the status to forward.
    pub fn upstream(sites: impl Into<String>, status: u16, message: impl fmt::Display) -> Self {
        Self::Upstream {
            sites: sites.into(),
            status,
            message: message.to_string(),
        }
    }

    /// HTTP status code this error should surface as.
    ///
    /// Upstream statuses are forwarded unchanged (429 included); anything
    /// outside the valid range falls back to 502.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidParam(_) => 400,
            Self::Upstream { status, .. } => {
                if (400..600).contains(status) {
                    *status
                } else {
                    502
                }
            }
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_param_maps_to_400() {
        let err = AppError::invalid_param("bad job_type");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn upstream_status_is_forwarded() {
        let err = AppError::upstream("indeed,linkedin", 429, "rate limited");
        assert_eq!(err.http_status(), 429);
    }

    #[test]
    fn upstream_out_of_range_falls_back_to_502() {
        let err = AppError::upstream("indeed", 302, "redirect");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn other_errors_map_to_500() {
        let err = AppError::config("missing upstream url");
        assert_eq!(err.http_status(), 500);
    }
}

// src/sites/mod.rs

//! Board adapters.
//!
//! Each supported job board is either scraper-backed (delegated to the
//! upstream jobspy-compatible scrape service) or a public REST API with a
//! dedicated adapter in this module. Adapters implement [`JobSource`] and
//! normalize board-specific response shapes into [`Job`].

mod arbeitnow;
mod jobicy;
mod remoteok;
mod remotive;
mod upstream;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use arbeitnow::Arbeitnow;
pub use jobicy::Jobicy;
pub use remoteok::RemoteOk;
pub use remotive::Remotive;
pub use upstream::UpstreamSource;

use crate::error::{AppError, Result};
use crate::models::{Job, SearchQuery};

/// A supported job board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    #[serde(rename = "arbeitnow")]
    Arbeitnow,
    #[serde(rename = "bayt")]
    Bayt,
    #[serde(rename = "bdjobs")]
    Bdjobs,
    #[serde(rename = "glassdoor")]
    Glassdoor,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "indeed")]
    Indeed,
    #[serde(rename = "jobicy")]
    Jobicy,
    #[serde(rename = "linkedin")]
    Linkedin,
    #[serde(rename = "naukri")]
    Naukri,
    #[serde(rename = "remoteok")]
    RemoteOk,
    #[serde(rename = "remotive")]
    Remotive,
    #[serde(rename = "zip_recruiter")]
    ZipRecruiter,
}

/// How a board is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Delegated to the upstream scrape service
    Upstream,
    /// Fetched directly from the board's public REST API
    PublicApi,
}

impl Site {
    /// All supported boards, sorted by name.
    pub fn all() -> &'static [Site] {
        &[
            Site::Arbeitnow,
            Site::Bayt,
            Site::Bdjobs,
            Site::Glassdoor,
            Site::Google,
            Site::Indeed,
            Site::Jobicy,
            Site::Linkedin,
            Site::Naukri,
            Site::RemoteOk,
            Site::Remotive,
            Site::ZipRecruiter,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Arbeitnow => "arbeitnow",
            Site::Bayt => "bayt",
            Site::Bdjobs => "bdjobs",
            Site::Glassdoor => "glassdoor",
            Site::Google => "google",
            Site::Indeed => "indeed",
            Site::Jobicy => "jobicy",
            Site::Linkedin => "linkedin",
            Site::Naukri => "naukri",
            Site::RemoteOk => "remoteok",
            Site::Remotive => "remotive",
            Site::ZipRecruiter => "zip_recruiter",
        }
    }

    pub fn kind(&self) -> SiteKind {
        match self {
            Site::Arbeitnow | Site::Jobicy | Site::RemoteOk | Site::Remotive => SiteKind::PublicApi,
            _ => SiteKind::Upstream,
        }
    }

    /// Parse a list of board names, rejecting unknown ones in a single
    /// error that names every offender and the valid set.
    pub fn parse_list(names: &[String]) -> Result<Vec<Site>> {
        let mut sites = Vec::with_capacity(names.len());
        let mut invalid = Vec::new();
        for name in names {
            match name.parse() {
                Ok(site) => sites.push(site),
                Err(_) => invalid.push(name.as_str()),
            }
        }
        if !invalid.is_empty() {
            let valid: Vec<&str> = Site::all().iter().map(Site::as_str).collect();
            return Err(AppError::invalid_param(format!(
                "Unknown site(s): {}. Valid: {}",
                invalid.join(", "),
                valid.join(", ")
            )));
        }
        Ok(sites)
    }
}

impl FromStr for Site {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arbeitnow" => Ok(Site::Arbeitnow),
            "bayt" => Ok(Site::Bayt),
            "bdjobs" => Ok(Site::Bdjobs),
            "glassdoor" => Ok(Site::Glassdoor),
            "google" => Ok(Site::Google),
            "indeed" => Ok(Site::Indeed),
            "jobicy" => Ok(Site::Jobicy),
            "linkedin" => Ok(Site::Linkedin),
            "naukri" => Ok(Site::Naukri),
            "remoteok" => Ok(Site::RemoteOk),
            "remotive" => Ok(Site::Remotive),
            "zip_recruiter" | "ziprecruiter" => Ok(Site::ZipRecruiter),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source of job postings: one public-API board, or the upstream scrape
/// service covering all scraper-backed boards in a request.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Label used in logs and error messages.
    fn label(&self) -> String;

    /// Whether a failure here may be tolerated when other sources succeed.
    fn failure_is_fatal(&self) -> bool {
        false
    }

    /// Fetch and normalize postings for the query.
    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>>;
}

//! Normalized job record shared by every board adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A job posting normalized into the common schema.
///
/// Every field is serialized even when absent (`null` rather than missing)
/// so all boards produce records with an identical key set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Job title
    pub title: Option<String>,

    /// Company name
    pub company: Option<String>,

    /// Board the posting came from (e.g. "indeed", "remoteok")
    pub site: String,

    /// Full URL to the posting
    pub job_url: Option<String>,

    /// Structured location
    pub location: Location,

    /// Whether the position is remote
    pub is_remote: Option<bool>,

    /// Employment type
    pub job_type: Option<JobType>,

    /// Seniority level, when the board provides one
    pub job_level: Option<String>,

    /// Posting date as ISO `YYYY-MM-DD`
    pub date_posted: Option<String>,

    /// Compensation range, when the board provides one
    pub salary: Option<Salary>,

    /// Posting body
    pub description: Option<String>,

    /// Contact emails found in the posting
    pub emails: Option<Vec<String>>,

    /// Skill tags
    pub skills: Vec<String>,

    /// Company page URL
    pub company_url: Option<String>,

    /// Company industry
    pub company_industry: Option<String>,
}

impl Job {
    /// Create an empty record for the given board.
    pub fn for_site(site: impl Into<String>) -> Self {
        Self {
            title: None,
            company: None,
            site: site.into(),
            job_url: None,
            location: Location::default(),
            is_remote: None,
            job_type: None,
            job_level: None,
            date_posted: None,
            salary: None,
            description: None,
            emails: None,
            skills: Vec::new(),
            company_url: None,
            company_industry: None,
        }
    }
}

/// Structured job location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// Build a location holding only a city/free-form string.
    pub fn city_only(city: impl Into<String>) -> Self {
        let city = city.into();
        Self {
            city: if city.is_empty() { None } else { Some(city) },
            state: None,
            country: None,
        }
    }

    /// Split a flat `"city, state, country"` string from the upstream
    /// scraper into its parts. Fewer than three tokens fill left to right.
    pub fn from_flat(raw: &str) -> Self {
        let parts: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [] => Self::default(),
            [city] => Self::city_only(*city),
            [city, state] => Self {
                city: Some((*city).to_string()),
                state: Some((*state).to_string()),
                country: None,
            },
            [city, state, rest @ ..] => Self {
                city: Some((*city).to_string()),
                state: Some((*state).to_string()),
                country: Some(rest.join(", ")),
            },
        }
    }
}

/// Compensation range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Salary {
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Pay interval (e.g. "yearly", "hourly")
    pub interval: String,
    /// ISO currency code
    pub currency: String,
}

impl Salary {
    /// Build a salary range, dropping zero/absent bounds.
    ///
    /// Returns `None` when neither bound is a positive amount, matching how
    /// boards report "no salary" as zeros.
    pub fn from_bounds(
        min: Option<f64>,
        max: Option<f64>,
        interval: Option<String>,
        currency: Option<String>,
    ) -> Option<Self> {
        let min = min.filter(|v| *v > 0.0);
        let max = max.filter(|v| *v > 0.0);
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self {
            min_amount: min,
            max_amount: max,
            interval: interval.unwrap_or_else(|| "yearly".to_string()),
            currency: currency.unwrap_or_else(|| "USD".to_string()),
        })
    }
}

/// Employment type in the normalized schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Fulltime,
    Parttime,
    Internship,
    Contract,
}

impl JobType {
    pub const VALID: [&'static str; 4] = ["fulltime", "parttime", "internship", "contract"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fulltime => "fulltime",
            Self::Parttime => "parttime",
            Self::Internship => "internship",
            Self::Contract => "contract",
        }
    }

    /// Map a board's free-form type label onto the normalized enum.
    ///
    /// Handles the variants seen across boards: `full-time`, `full_time`,
    /// `part-time`, `intern`, `freelance` (treated as contract), etc.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("full") {
            Some(Self::Fulltime)
        } else if label.contains("part") {
            Some(Self::Parttime)
        } else if label.contains("intern") {
            Some(Self::Internship)
        } else if label.contains("contract") || label.contains("freelance") {
            Some(Self::Contract)
        } else {
            None
        }
    }

    /// Derive a type from a board's list of type labels (first match wins,
    /// checked in enum order as the original API does).
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let joined = labels.into_iter().collect::<Vec<_>>().join(" ").to_lowercase();
        if joined.contains("full") {
            Some(Self::Fulltime)
        } else if joined.contains("part") {
            Some(Self::Parttime)
        } else if joined.contains("intern") {
            Some(Self::Internship)
        } else if joined.contains("contract") || joined.contains("freelance") {
            Some(Self::Contract)
        } else {
            None
        }
    }
}

impl FromStr for JobType {
    type Err = ();

    /// Strict parse of the normalized names used in request parameters.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fulltime" => Ok(Self::Fulltime),
            "parttime" => Ok(Self::Parttime),
            "internship" => Ok(Self::Internship),
            "contract" => Ok(Self::Contract),
            _ => Err(()),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

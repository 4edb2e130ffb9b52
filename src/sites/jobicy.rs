//! Jobicy adapter (https://jobicy.com/api/v2/remote-jobs).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Job, JobType, Location, Salary, SearchQuery};
use crate::sites::{JobSource, Site};
use crate::utils::{date_prefix, decode_entities, parse_timestamp};

const API_URL: &str = "https://jobicy.com/api/v2/remote-jobs";

/// The API caps `count` at 50.
const MAX_COUNT: usize = 50;

/// Jobicy job board. Remote positions only.
pub struct Jobicy;

#[async_trait]
impl JobSource for Jobicy {
    fn label(&self) -> String {
        Site::Jobicy.to_string()
    }

    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>> {
        // Remote-only board
        if query.is_remote == Some(false) {
            return Ok(Vec::new());
        }

        let count = query.window_end().min(MAX_COUNT);
        let mut params: Vec<(&str, String)> = vec![("count", count.to_string())];
        if let Some(term) = &query.search_term {
            params.push(("tag", term.clone()));
        }
        if let Some(geo) = geo_filter(query) {
            params.push(("geo", geo));
        }

        let response: ApiResponse = client
            .get(API_URL)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(normalize(response.jobs, query, Utc::now().timestamp()))
    }
}

/// `geo` expects a plain country name (e.g. "usa", "germany"). Prefer
/// `country_indeed`; otherwise take the last comma-separated token of
/// `location` ("New York, NY, USA" → "usa").
fn geo_filter(query: &SearchQuery) -> Option<String> {
    if let Some(country) = query.country_indeed.as_deref() {
        let country = country.trim();
        if !country.is_empty() {
            return Some(country.to_lowercase());
        }
    }
    let location = query.location.as_deref()?.trim();
    let last = location.rsplit(',').next()?.trim();
    if last.is_empty() {
        None
    } else {
        Some(last.to_lowercase())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiResponse {
    jobs: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    #[serde(rename = "jobTitle")]
    title: Option<String>,
    #[serde(rename = "companyName")]
    company: Option<String>,
    url: Option<String>,
    #[serde(rename = "jobGeo")]
    geo: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "jobType")]
    job_types: Vec<String>,
    #[serde(rename = "jobLevel")]
    level: Option<String>,
    #[serde(rename = "jobIndustry")]
    industries: Vec<String>,
    #[serde(rename = "jobDescription")]
    description: Option<String>,
    #[serde(rename = "salaryMin")]
    salary_min: Option<f64>,
    #[serde(rename = "salaryMax")]
    salary_max: Option<f64>,
    #[serde(rename = "salaryPeriod")]
    salary_period: Option<String>,
    #[serde(rename = "salaryCurrency")]
    salary_currency: Option<String>,
}

fn normalize(mut entries: Vec<Entry>, query: &SearchQuery, now: i64) -> Vec<Job> {
    if let Some(hours) = query.hours_old {
        let cutoff = now.saturating_sub(hours.saturating_mul(3600));
        entries.retain(|e| {
            e.pub_date
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(0)
                >= cutoff
        });
    }

    if let Some(wanted) = query.job_type {
        entries.retain(|e| {
            e.job_types
                .iter()
                .any(|label| JobType::from_label(label) == Some(wanted))
        });
    }

    query.window(entries).into_iter().map(to_job).collect()
}

fn to_job(entry: Entry) -> Job {
    let mut job = Job::for_site(Site::Jobicy.as_str());
    job.job_type = JobType::from_labels(entry.job_types.iter().map(String::as_str));
    // Titles come back double-escaped ("&amp;amp;"), so decode twice
    job.title = entry
        .title
        .map(|t| decode_entities(&decode_entities(&t)))
        .filter(|s| !s.is_empty());
    job.company = entry.company.filter(|s| !s.is_empty());
    job.job_url = entry.url.filter(|s| !s.is_empty());
    job.location = Location::city_only(entry.geo.unwrap_or_default());
    job.is_remote = Some(true);
    job.job_level = entry.level.filter(|s| !s.is_empty());
    job.date_posted = entry.pub_date.as_deref().and_then(date_prefix);
    job.salary = Salary::from_bounds(
        entry.salary_min,
        entry.salary_max,
        entry.salary_period.filter(|s| !s.is_empty()),
        entry.salary_currency.filter(|s| !s.is_empty()),
    );
    job.description = entry.description.filter(|s| !s.is_empty());
    job.company_industry = entry.industries.into_iter().find(|s| !s.is_empty());
    job
}

//! Upstream scrape service adapter.
//!
//! Boards without public APIs (Indeed, LinkedIn, Glassdoor, ZipRecruiter,
//! Google Jobs, Bayt, BDJobs, Naukri) are delegated to an operator-configured
//! jobspy-compatible scrape service. This adapter builds the scrape request
//! for all such boards in one call and normalizes the service's flat records
//! into the common schema.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{DescriptionFormat, Job, JobType, Location, Salary, SearchQuery};
use crate::models::UpstreamConfig;
use crate::sites::{JobSource, Site};
use crate::utils::date_prefix;

/// One scrape call covering every scraper-backed board in the request.
#[derive(Debug)]
pub struct UpstreamSource {
    sites: Vec<Site>,
    endpoint: Option<String>,
}

impl UpstreamSource {
    /// Build the adapter for the given scraper-backed boards.
    ///
    /// A missing upstream URL is reported at fetch time, so the fan-out's
    /// tolerance policy decides whether the request survives it.
    pub fn new(sites: Vec<Site>, config: &UpstreamConfig) -> Self {
        let endpoint = config
            .url
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), config.path));
        Self { sites, endpoint }
    }

    fn payload<'a>(&'a self, query: &'a SearchQuery) -> ScrapeRequest<'a> {
        ScrapeRequest {
            site_name: self.sites.iter().map(Site::as_str).collect(),
            search_term: query.search_term.as_deref(),
            google_search_term: query.google_search_term.as_deref(),
            location: query.location.as_deref(),
            distance: query.distance,
            job_type: query.job_type,
            is_remote: query.is_remote,
            results_wanted: query.results_wanted,
            hours_old: query.hours_old,
            easy_apply: query.easy_apply,
            description_format: query.description_format,
            offset: query.offset,
            linkedin_fetch_description: query.linkedin_fetch_description,
            linkedin_company_ids: query.linkedin_company_ids.as_deref(),
            country_indeed: query.country_indeed.as_deref(),
            enforce_annual_salary: query.enforce_annual_salary,
            proxies: query.proxies.as_deref(),
            user_agent: query.user_agent.as_deref(),
            verbose: 0,
        }
    }
}

#[async_trait]
impl JobSource for UpstreamSource {
    fn label(&self) -> String {
        join_sites(&self.sites)
    }

    fn failure_is_fatal(&self) -> bool {
        true
    }

    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            AppError::config(format!(
                "upstream.url is not configured; required for sites: {}",
                self.label()
            ))
        })?;
        let response = client
            .post(endpoint)
            .json(&self.payload(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Forward the status (429 included) rather than retrying
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                self.label(),
                status.as_u16(),
                truncate(&body, 200),
            ));
        }

        let parsed: ScrapeResponse = response.json().await?;
        Ok(parsed.into_records().into_iter().map(to_job).collect())
    }
}

fn join_sites(sites: &[Site]) -> String {
    sites
        .iter()
        .map(Site::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

/// Request body in the scrape service's keyword vocabulary.
#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    site_name: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_term: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search_term: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    distance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_remote: Option<bool>,
    results_wanted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hours_old: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    easy_apply: Option<bool>,
    description_format: DescriptionFormat,
    offset: usize,
    linkedin_fetch_description: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    linkedin_company_ids: Option<&'a [i64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country_indeed: Option<&'a str>,
    enforce_annual_salary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxies: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
    verbose: u8,
}

/// The service returns either a bare array of records or `{"jobs": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScrapeResponse {
    Wrapped { jobs: Vec<RawRecord> },
    Bare(Vec<RawRecord>),
}

impl ScrapeResponse {
    fn into_records(self) -> Vec<RawRecord> {
        match self {
            Self::Wrapped { jobs } => jobs,
            Self::Bare(records) => records,
        }
    }
}

/// A flat record with the scrape service's column names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    site: Option<String>,
    title: Option<String>,
    company: Option<String>,
    job_url: Option<String>,
    job_url_direct: Option<String>,
    location: Option<String>,
    is_remote: Option<bool>,
    job_type: Option<String>,
    job_level: Option<String>,
    date_posted: Option<String>,
    interval: Option<String>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    currency: Option<String>,
    description: Option<String>,
    emails: Option<StringOrList>,
    skills: Option<StringOrList>,
    company_url: Option<String>,
    company_industry: Option<String>,
}

/// CSV string or JSON array; the service flattens list columns either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            Self::One(s) => s.split(',').map(str::trim).map(str::to_string).collect(),
            Self::Many(items) => items,
        };
        items.into_iter().filter(|s| !s.is_empty()).collect()
    }
}

fn to_job(record: RawRecord) -> Job {
    let mut job = Job::for_site(record.site.unwrap_or_else(|| "unknown".to_string()));
    job.title = record.title.filter(|s| !s.is_empty());
    job.company = record.company.filter(|s| !s.is_empty());
    job.job_url = record
        .job_url
        .or(record.job_url_direct)
        .filter(|s| !s.is_empty());
    job.location = record
        .location
        .as_deref()
        .map(Location::from_flat)
        .unwrap_or_default();
    job.is_remote = record.is_remote;
    job.job_type = record.job_type.as_deref().and_then(JobType::from_label);
    job.job_level = record.job_level.filter(|s| !s.is_empty());
    job.date_posted = record.date_posted.as_deref().and_then(date_prefix);
    job.salary = Salary::from_bounds(
        record.min_amount,
        record.max_amount,
        record.interval.filter(|s| !s.is_empty()),
        record.currency.filter(|s| !s.is_empty()),
    );
    job.description = record.description.filter(|s| !s.is_empty());
    job.emails = record
        .emails
        .map(StringOrList::into_vec)
        .filter(|v| !v.is_empty());
    job.skills = record.skills.map(StringOrList::into_vec).unwrap_or_default();
    job.company_url = record.company_url.filter(|s| !s.is_empty());
    job.company_industry = record.company_industry.filter(|s| !s.is_empty());
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, SearchParams};

    fn upstream(sites: Vec<Site>) -> UpstreamSource {
        let mut config = Config::default();
        config.upstream.url = Some("http://scraper.internal:8000".to_string());
        UpstreamSource::new(sites, &config.upstream)
    }

    #[tokio::test]
    async fn fetch_without_url_is_config_error() {
        let source = UpstreamSource::new(vec![Site::Indeed], &Config::default().upstream);
        let query = SearchParams::default().validate().unwrap();
        let err = source.fetch(&Client::new(), &query).await.unwrap_err();
        assert!(err.to_string().contains("upstream.url"));
        assert!(err.to_string().contains("indeed"));
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let source = upstream(vec![Site::Indeed]);
        assert_eq!(
            source.endpoint.as_deref(),
            Some("http://scraper.internal:8000/scrape")
        );
    }

    #[test]
    fn payload_uses_scrape_service_vocabulary() {
        let source = upstream(vec![Site::Indeed, Site::Linkedin]);
        let query = SearchParams::from_pairs(
            [
                ("search_term", "software engineer"),
                ("job_type", "fulltime"),
                ("linkedin_company_ids", "1441,2382"),
                ("enforce_annual_salary", "true"),
            ]
            .into_iter(),
        )
        .validate()
        .unwrap();

        let value = serde_json::to_value(source.payload(&query)).unwrap();
        assert_eq!(value["site_name"], serde_json::json!(["indeed", "linkedin"]));
        assert_eq!(value["search_term"], "software engineer");
        assert_eq!(value["job_type"], "fulltime");
        assert_eq!(value["linkedin_company_ids"], serde_json::json!([1441, 2382]));
        assert_eq!(value["enforce_annual_salary"], true);
        assert_eq!(value["description_format"], "markdown");
        assert_eq!(value["verbose"], 0);
        assert!(value.get("location").is_none());
        assert!(value.get("hours_old").is_none());
    }

    #[test]
    fn response_accepts_both_shapes() {
        let wrapped: ScrapeResponse =
            serde_json::from_str(r#"{"jobs": [{"site": "indeed"}]}"#).unwrap();
        assert_eq!(wrapped.into_records().len(), 1);

        let bare: ScrapeResponse = serde_json::from_str(r#"[{"site": "indeed"}]"#).unwrap();
        assert_eq!(bare.into_records().len(), 1);
    }

    #[test]
    fn record_normalization() {
        let record: RawRecord = serde_json::from_str(
            r#"{
                "site": "indeed",
                "title": "Backend Developer",
                "company": "Acme",
                "job_url": "https://indeed.com/viewjob?jk=abc",
                "location": "Austin, TX, USA",
                "is_remote": false,
                "job_type": "fulltime",
                "date_posted": "2024-05-29T00:00:00",
                "interval": "yearly",
                "min_amount": 95000.0,
                "max_amount": 120000.0,
                "currency": "USD",
                "emails": "jobs@acme.com, hr@acme.com",
                "skills": ["rust", "sql"]
            }"#,
        )
        .unwrap();

        let job = to_job(record);
        assert_eq!(job.site, "indeed");
        assert_eq!(job.location.city.as_deref(), Some("Austin"));
        assert_eq!(job.location.state.as_deref(), Some("TX"));
        assert_eq!(job.location.country.as_deref(), Some("USA"));
        assert_eq!(job.date_posted.as_deref(), Some("2024-05-29"));
        assert_eq!(
            job.emails,
            Some(vec!["jobs@acme.com".to_string(), "hr@acme.com".to_string()])
        );
        assert_eq!(job.skills, vec!["rust", "sql"]);
        assert_eq!(job.salary.unwrap().max_amount, Some(120000.0));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 200), "short");
        let long = "é".repeat(300);
        let cut = truncate(&long, 199);
        assert!(cut.ends_with('…'));
    }
}

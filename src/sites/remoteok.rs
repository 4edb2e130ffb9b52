//! RemoteOK adapter (https://remoteok.com/api).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::models::{Job, Location, Salary, SearchQuery};
use crate::sites::{JobSource, Site};
use crate::utils::date_prefix;

const API_URL: &str = "https://remoteok.com/api";

/// RemoteOK lists remote positions only.
pub struct RemoteOk;

#[async_trait]
impl JobSource for RemoteOk {
    fn label(&self) -> String {
        Site::RemoteOk.to_string()
    }

    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>> {
        // Remote-only board
        if query.is_remote == Some(false) {
            return Ok(Vec::new());
        }

        let url = match &query.search_term {
            Some(term) => format!("{API_URL}?tag={}", term.replace(' ', "+")),
            None => API_URL.to_string(),
        };

        let entries: Vec<Entry> = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(normalize(entries, query, Utc::now().timestamp()))
    }
}

/// One element of the RemoteOK feed. The first element is a legal notice
/// without a `position`; `epoch` arrives as a string on some records.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    position: Option<String>,
    company: Option<String>,
    url: Option<String>,
    apply_url: Option<String>,
    location: Option<String>,
    date: Option<String>,
    #[serde(deserialize_with = "flexible_i64")]
    epoch: Option<i64>,
    #[serde(deserialize_with = "flexible_f64")]
    salary_min: Option<f64>,
    #[serde(deserialize_with = "flexible_f64")]
    salary_max: Option<f64>,
    description: Option<String>,
    tags: Vec<String>,
}

fn normalize(entries: Vec<Entry>, query: &SearchQuery, now: i64) -> Vec<Job> {
    let mut entries: Vec<Entry> = entries
        .into_iter()
        .filter(|e| e.position.is_some())
        .collect();

    if let Some(hours) = query.hours_old {
        let cutoff = now.saturating_sub(hours.saturating_mul(3600));
        entries.retain(|e| e.epoch.unwrap_or(0) >= cutoff);
    }

    query.window(entries).into_iter().map(to_job).collect()
}

fn to_job(entry: Entry) -> Job {
    let mut job = Job::for_site(Site::RemoteOk.as_str());
    job.title = entry.position.filter(|s| !s.is_empty());
    job.company = entry.company.filter(|s| !s.is_empty());
    job.job_url = entry.url.or(entry.apply_url).filter(|s| !s.is_empty());
    job.location = Location::city_only(entry.location.unwrap_or_default());
    job.is_remote = Some(true);
    job.date_posted = entry.date.as_deref().and_then(date_prefix);
    job.salary = Salary::from_bounds(
        entry.salary_min,
        entry.salary_max,
        Some("yearly".to_string()),
        Some("USD".to_string()),
    );
    job.description = entry.description.filter(|s| !s.is_empty());
    job.skills = entry.tags;
    job
}

/// Accept an integer given as a JSON number or a string.
fn flexible_i64<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<i64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

/// Accept a float given as a JSON number or a string.
fn flexible_f64<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchParams;

    const FEED: &str = r#"[
        {"legal": "API terms of service apply."},
        {
            "position": "Rust Engineer",
            "company": "Acme",
            "url": "https://remoteok.com/jobs/1",
            "location": "Worldwide",
            "date": "2024-05-29T10:11:32+00:00",
            "epoch": "1716977492",
            "salary_min": 90000,
            "salary_max": 120000,
            "tags": ["rust", "backend"]
        },
        {
            "position": "QA Analyst",
            "apply_url": "https://remoteok.com/jobs/2",
            "date": "2024-05-01T00:00:00+00:00",
            "epoch": 1714521600,
            "salary_min": 0,
            "tags": []
        }
    ]"#;

    fn feed() -> Vec<Entry> {
        serde_json::from_str(FEED).unwrap()
    }

    fn query(pairs: &[(&'static str, &'static str)]) -> SearchQuery {
        SearchParams::from_pairs(pairs.iter().copied())
            .validate()
            .unwrap()
    }

    #[test]
    fn skips_legal_notice_entry() {
        let jobs = normalize(feed(), &query(&[]), 1716979000);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title.as_deref(), Some("Rust Engineer"));
    }

    #[test]
    fn normalizes_fields() {
        let jobs = normalize(feed(), &query(&[]), 1716979000);
        let job = &jobs[0];
        assert_eq!(job.site, "remoteok");
        assert_eq!(job.is_remote, Some(true));
        assert_eq!(job.date_posted.as_deref(), Some("2024-05-29"));
        assert_eq!(job.location.city.as_deref(), Some("Worldwide"));
        assert_eq!(job.skills, vec!["rust", "backend"]);
        let salary = job.salary.as_ref().unwrap();
        assert_eq!(salary.min_amount, Some(90000.0));
        assert_eq!(salary.currency, "USD");
    }

    #[test]
    fn zero_salary_is_absent() {
        let jobs = normalize(feed(), &query(&[]), 1716979000);
        assert!(jobs[1].salary.is_none());
        assert_eq!(jobs[1].job_url.as_deref(), Some("https://remoteok.com/jobs/2"));
    }

    #[test]
    fn hours_old_filters_on_epoch() {
        // now = epoch of first entry + 1h; 2h window keeps only that entry
        let now = 1716977492 + 3600;
        let jobs = normalize(feed(), &query(&[("hours_old", "2")]), now);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("Rust Engineer"));
    }

    #[test]
    fn enormous_hours_old_keeps_everything() {
        // i64::MAX hours must not overflow the cutoff arithmetic
        let query = query(&[("hours_old", "9223372036854775807")]);
        let jobs = normalize(feed(), &query, 1716979000);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn window_applies_offset() {
        let jobs = normalize(feed(), &query(&[("offset", "1")]), 1716979000);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("QA Analyst"));
    }
}

//! Arbeitnow adapter (https://www.arbeitnow.com/api/job-board-api).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Job, JobType, Location, SearchQuery};
use crate::sites::{JobSource, Site};
use crate::utils::epoch_to_date;

const API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

/// Arbeitnow paginates; stop after this many pages even if the board keeps
/// advertising a next link.
const MAX_PAGES: u32 = 5;

/// Arbeitnow job board. Lists both remote and on-site positions.
pub struct Arbeitnow;

#[async_trait]
impl JobSource for Arbeitnow {
    fn label(&self) -> String {
        Site::Arbeitnow.to_string()
    }

    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>> {
        let mut base_params: Vec<(&str, String)> = Vec::new();
        if let Some(term) = &query.search_term {
            base_params.push(("search", term.clone()));
        }
        if query.is_remote == Some(true) {
            base_params.push(("remote", "true".to_string()));
        }

        let mut entries = Vec::new();
        let mut page = 1u32;
        while entries.len() < query.window_end() {
            let mut params = base_params.clone();
            params.push(("page", page.to_string()));

            let response: ApiResponse = client
                .get(API_URL)
                .query(&params)
                .header("Accept", "application/json")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if response.data.is_empty() {
                break;
            }
            entries.extend(response.data);
            if response.links.next.is_none() || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        Ok(normalize(entries, query, Utc::now().timestamp()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiResponse {
    data: Vec<Entry>,
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    title: Option<String>,
    company_name: Option<String>,
    url: Option<String>,
    location: Option<String>,
    remote: bool,
    job_types: Vec<String>,
    tags: Vec<String>,
    created_at: Option<i64>,
    description: Option<String>,
}

fn normalize(mut entries: Vec<Entry>, query: &SearchQuery, now: i64) -> Vec<Job> {
    if let Some(hours) = query.hours_old {
        let cutoff = now.saturating_sub(hours.saturating_mul(3600));
        entries.retain(|e| e.created_at.unwrap_or(0) >= cutoff);
    }

    match query.is_remote {
        Some(true) => entries.retain(|e| e.remote),
        Some(false) => entries.retain(|e| !e.remote),
        None => {}
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
    let mut job = Job::for_site(Site::Arbeitnow.as_str());
    job.job_type = JobType::from_labels(entry.job_types.iter().map(String::as_str));
    job.title = entry.title.filter(|s| !s.is_empty());
    job.company = entry.company_name.filter(|s| !s.is_empty());
    job.job_url = entry.url.filter(|s| !s.is_empty());
    job.location = Location::city_only(entry.location.unwrap_or_default());
    job.is_remote = Some(entry.remote);
    job.date_posted = entry.created_at.and_then(epoch_to_date);
    job.description = entry.description.filter(|s| !s.is_empty());
    job.skills = entry.tags;
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchParams;

    const PAGE: &str = r#"{
        "data": [
            {
                "title": "Backend Engineer",
                "company_name": "Beispiel GmbH",
                "url": "https://arbeitnow.com/view/1",
                "location": "Berlin",
                "remote": true,
                "job_types": ["Full-time"],
                "tags": ["python"],
                "created_at": 1716977492,
                "description": "Build things."
            },
            {
                "title": "Werkstudent QA",
                "company_name": "Beispiel GmbH",
                "url": "https://arbeitnow.com/view/2",
                "location": "Munich",
                "remote": false,
                "job_types": ["Intern"],
                "created_at": 1714521600
            }
        ],
        "links": {"next": null}
    }"#;

    fn entries() -> Vec<Entry> {
        serde_json::from_str::<ApiResponse>(PAGE).unwrap().data
    }

    fn query(pairs: &[(&'static str, &'static str)]) -> SearchQuery {
        SearchParams::from_pairs(pairs.iter().copied())
            .validate()
            .unwrap()
    }

    #[test]
    fn normalizes_fields() {
        let jobs = normalize(entries(), &query(&[]), 1716979000);
        assert_eq!(jobs.len(), 2);
        let job = &jobs[0];
        assert_eq!(job.site, "arbeitnow");
        assert_eq!(job.job_type, Some(JobType::Fulltime));
        assert_eq!(job.is_remote, Some(true));
        assert_eq!(job.date_posted.as_deref(), Some("2024-05-29"));
        assert_eq!(jobs[1].job_type, Some(JobType::Internship));
    }

    #[test]
    fn is_remote_filters_both_directions() {
        let remote = normalize(entries(), &query(&[("is_remote", "true")]), 1716979000);
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].title.as_deref(), Some("Backend Engineer"));

        let onsite = normalize(entries(), &query(&[("is_remote", "false")]), 1716979000);
        assert_eq!(onsite.len(), 1);
        assert_eq!(onsite[0].title.as_deref(), Some("Werkstudent QA"));
    }

    #[test]
    fn job_type_filter_uses_label_mapping() {
        let jobs = normalize(entries(), &query(&[("job_type", "internship")]), 1716979000);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("Werkstudent QA"));
    }

    #[test]
    fn enormous_hours_old_keeps_everything() {
        let query = query(&[("hours_old", "9223372036854775807")]);
        let jobs = normalize(entries(), &query, 1716979000);
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn hours_old_filters_on_created_at() {
        let now = 1716977492 + 3600;
        let jobs = normalize(entries(), &query(&[("hours_old", "2")]), now);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("Backend Engineer"));
    }
}

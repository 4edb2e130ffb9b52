//! Remotive adapter (https://remotive.com/api/remote-jobs).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Job, JobType, Location, SearchQuery};
use crate::sites::{JobSource, Site};
use crate::utils::{date_prefix, parse_timestamp};

const API_URL: &str = "https://remotive.com/api/remote-jobs";

/// Locations that satisfy any location filter.
const ANYWHERE: [&str; 2] = ["worldwide", "anywhere"];

/// Remotive job board. Remote positions only.
pub struct Remotive;

#[async_trait]
impl JobSource for Remotive {
    fn label(&self) -> String {
        Site::Remotive.to_string()
    }

    async fn fetch(&self, client: &Client, query: &SearchQuery) -> Result<Vec<Job>> {
        // Remote-only board
        if query.is_remote == Some(false) {
            return Ok(Vec::new());
        }

        let mut params: Vec<(&str, String)> = vec![("limit", query.window_end().to_string())];
        if let Some(term) = &query.search_term {
            params.push(("search", term.clone()));
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

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiResponse {
    jobs: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    title: Option<String>,
    company_name: Option<String>,
    url: Option<String>,
    candidate_required_location: Option<String>,
    publication_date: Option<String>,
    job_type: Option<String>,
    category: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

fn normalize(mut entries: Vec<Entry>, query: &SearchQuery, now: i64) -> Vec<Job> {
    // The API has no location parameter; post-filter on the candidate
    // location, preferring country_indeed over the free-form location.
    let loc_filter = query
        .country_indeed
        .as_deref()
        .or(query.location.as_deref())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    if let Some(filter) = loc_filter {
        entries.retain(|e| {
            let candidate = e
                .candidate_required_location
                .as_deref()
                .unwrap_or("")
                .to_lowercase();
            candidate.contains(&filter) || ANYWHERE.iter().any(|kw| candidate.contains(kw))
        });
    }

    if let Some(hours) = query.hours_old {
        let cutoff = now.saturating_sub(hours.saturating_mul(3600));
        entries.retain(|e| {
            e.publication_date
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(0)
                >= cutoff
        });
    }

    query.window(entries).into_iter().map(to_job).collect()
}

fn to_job(entry: Entry) -> Job {
    let mut job = Job::for_site(Site::Remotive.as_str());
    // "other" maps to no type; from_label already returns None for it
    job.job_type = entry.job_type.as_deref().and_then(JobType::from_label);
    job.title = entry.title.filter(|s| !s.is_empty());
    job.company = entry.company_name.filter(|s| !s.is_empty());
    job.job_url = entry.url.filter(|s| !s.is_empty());
    job.location = Location::city_only(entry.candidate_required_location.unwrap_or_default());
    job.is_remote = Some(true);
    job.date_posted = entry.publication_date.as_deref().and_then(date_prefix);
    job.description = entry.description.filter(|s| !s.is_empty());
    job.skills = entry.tags;
    job.company_industry = entry.category.filter(|s| !s.is_empty());
    job
}

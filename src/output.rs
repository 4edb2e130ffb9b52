// src/output.rs

//! Response encoding: the JSON payload and the CSV attachment.

use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::Job;
use crate::search::SearchOutcome;

/// Column order of the CSV attachment.
const CSV_COLUMNS: [&str; 20] = [
    "site",
    "title",
    "company",
    "job_url",
    "city",
    "state",
    "country",
    "is_remote",
    "job_type",
    "job_level",
    "date_posted",
    "salary_min",
    "salary_max",
    "salary_interval",
    "salary_currency",
    "description",
    "skills",
    "emails",
    "company_url",
    "company_industry",
];

/// Build the JSON response body.
pub fn json_payload(outcome: &SearchOutcome) -> serde_json::Value {
    json!({
        "jobs": outcome.jobs,
        "count": outcome.jobs.len(),
        "sites": outcome.sites,
        "query": outcome.query,
    })
}

/// Encode jobs as CSV with flattened location/salary columns.
pub fn to_csv(jobs: &[Job]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for job in jobs {
        writer.write_record(csv_row(job))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::config(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::config(format!("CSV is not UTF-8: {e}")))
}

fn csv_row(job: &Job) -> Vec<String> {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    let num = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

    vec![
        job.site.clone(),
        opt(&job.title),
        opt(&job.company),
        opt(&job.job_url),
        opt(&job.location.city),
        opt(&job.location.state),
        opt(&job.location.country),
        job.is_remote.map(|v| v.to_string()).unwrap_or_default(),
        job.job_type.map(|t| t.to_string()).unwrap_or_default(),
        opt(&job.job_level),
        opt(&job.date_posted),
        num(job.salary.as_ref().and_then(|s| s.min_amount)),
        num(job.salary.as_ref().and_then(|s| s.max_amount)),
        job.salary.as_ref().map(|s| s.interval.clone()).unwrap_or_default(),
        job.salary.as_ref().map(|s| s.currency.clone()).unwrap_or_default(),
        opt(&job.description),
        job.skills.join(", "),
        job.emails.as_ref().map(|e| e.join(", ")).unwrap_or_default(),
        opt(&job.company_url),
        opt(&job.company_industry),
    ]
}

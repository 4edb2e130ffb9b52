//! Search request parameters.
//!
//! Parameters arrive two ways: querystring pairs (everything is a string,
//! coerced leniently) and a JSON body (typed). The raw [`SearchParams`] form
//! supports both and merging; [`SearchQuery`] is the validated form the rest
//! of the crate consumes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::JobType;
use crate::sites::Site;

/// Strings accepted as `true` in querystring booleans.
const TRUTHY: [&str; 3] = ["1", "true", "yes"];

const DEFAULT_RESULTS_WANTED: usize = 15;
const DEFAULT_DISTANCE: u32 = 50;

/// Raw, all-optional request parameters.
///
/// Deserializable from a POST body; buildable from querystring pairs with
/// [`SearchParams::from_pairs`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub site_name: Option<Vec<String>>,
    pub search_term: Option<String>,
    pub google_search_term: Option<String>,
    pub location: Option<String>,
    pub distance: Option<i64>,
    pub job_type: Option<String>,
    pub is_remote: Option<bool>,
    pub results_wanted: Option<i64>,
    pub hours_old: Option<i64>,
    pub easy_apply: Option<bool>,
    pub description_format: Option<String>,
    pub offset: Option<i64>,
    pub linkedin_fetch_description: Option<bool>,
    pub linkedin_company_ids: Option<Vec<i64>>,
    pub country_indeed: Option<String>,
    pub enforce_annual_salary: Option<bool>,
    pub proxies: Option<Vec<String>>,
    pub user_agent: Option<String>,
    pub output_format: Option<String>,
}

impl SearchParams {
    /// Build raw parameters from querystring pairs.
    ///
    /// Coercion is lenient in the same places the original API is lenient:
    /// booleans accept `1|true|yes`, unparsable integers are treated as
    /// absent, list parameters are comma-separated with bad entries skipped.
    /// Empty values count as absent.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "site_name" => params.site_name = csv_strings(value),
                "search_term" => params.search_term = Some(value.to_string()),
                "google_search_term" => params.google_search_term = Some(value.to_string()),
                "location" => params.location = Some(value.to_string()),
                "distance" => params.distance = value.parse().ok(),
                "job_type" => params.job_type = Some(value.to_string()),
                "is_remote" => params.is_remote = Some(truthy(value)),
                "results_wanted" => params.results_wanted = value.parse().ok(),
                "hours_old" => params.hours_old = value.parse().ok(),
                "easy_apply" => params.easy_apply = Some(truthy(value)),
                "description_format" => params.description_format = Some(value.to_string()),
                "offset" => params.offset = value.parse().ok(),
                "linkedin_fetch_description" => {
                    params.linkedin_fetch_description = Some(truthy(value))
                }
                "linkedin_company_ids" => params.linkedin_company_ids = csv_ints(value),
                "country_indeed" => params.country_indeed = Some(value.to_string()),
                "enforce_annual_salary" => params.enforce_annual_salary = Some(truthy(value)),
                "proxies" => params.proxies = csv_strings(value),
                "user_agent" => params.user_agent = Some(value.to_string()),
                "output_format" => params.output_format = Some(value.to_string()),
                _ => {}
            }
        }
        params
    }

    /// Overlay `self` on top of `base`: present fields win, absent fields
    /// fall through to `base`. Used to let a POST body override querystring
    /// values.
    pub fn merged_over(self, base: Self) -> Self {
        Self {
            site_name: self.site_name.or(base.site_name),
            search_term: self.search_term.or(base.search_term),
            google_search_term: self.google_search_term.or(base.google_search_term),
            location: self.location.or(base.location),
            distance: self.distance.or(base.distance),
            job_type: self.job_type.or(base.job_type),
            is_remote: self.is_remote.or(base.is_remote),
            results_wanted: self.results_wanted.or(base.results_wanted),
            hours_old: self.hours_old.or(base.hours_old),
            easy_apply: self.easy_apply.or(base.easy_apply),
            description_format: self.description_format.or(base.description_format),
            offset: self.offset.or(base.offset),
            linkedin_fetch_description: self
                .linkedin_fetch_description
                .or(base.linkedin_fetch_description),
            linkedin_company_ids: self.linkedin_company_ids.or(base.linkedin_company_ids),
            country_indeed: self.country_indeed.or(base.country_indeed),
            enforce_annual_salary: self.enforce_annual_salary.or(base.enforce_annual_salary),
            proxies: self.proxies.or(base.proxies),
            user_agent: self.user_agent.or(base.user_agent),
            output_format: self.output_format.or(base.output_format),
        }
    }

    /// Validate into a [`SearchQuery`], applying defaults.
    pub fn validate(self) -> Result<SearchQuery> {
        let sites = match self.site_name {
            Some(names) => Site::parse_list(&names)?,
            None => Site::all().to_vec(),
        };

        let job_type = match non_empty(self.job_type) {
            Some(raw) => Some(JobType::from_str(&raw).map_err(|_| {
                AppError::invalid_param(format!(
                    "Invalid job_type '{}'. Valid: {}",
                    raw,
                    JobType::VALID.join(", ")
                ))
            })?),
            None => None,
        };

        let description_format = match non_empty(self.description_format) {
            Some(raw) => DescriptionFormat::from_str(&raw).map_err(|_| {
                AppError::invalid_param(format!(
                    "Invalid description_format '{raw}'. Valid: markdown, html"
                ))
            })?,
            None => DescriptionFormat::Markdown,
        };

        let output_format = match non_empty(self.output_format) {
            Some(raw) => OutputFormat::from_str(&raw).map_err(|_| {
                AppError::invalid_param(format!("Invalid output_format '{raw}'. Valid: json, csv"))
            })?,
            None => OutputFormat::Json,
        };

        Ok(SearchQuery {
            sites,
            search_term: non_empty(self.search_term),
            google_search_term: non_empty(self.google_search_term),
            location: non_empty(self.location),
            distance: self
                .distance
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_DISTANCE),
            job_type,
            is_remote: self.is_remote,
            results_wanted: self
                .results_wanted
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(DEFAULT_RESULTS_WANTED),
            hours_old: self.hours_old.filter(|v| *v > 0),
            easy_apply: self.easy_apply,
            description_format,
            offset: self.offset.and_then(|v| usize::try_from(v).ok()).unwrap_or(0),
            linkedin_fetch_description: self.linkedin_fetch_description.unwrap_or(false),
            linkedin_company_ids: self.linkedin_company_ids.filter(|v| !v.is_empty()),
            country_indeed: non_empty(self.country_indeed),
            enforce_annual_salary: self.enforce_annual_salary.unwrap_or(false),
            proxies: self.proxies.filter(|v| !v.is_empty()),
            user_agent: non_empty(self.user_agent),
            output_format,
        })
    }
}

/// Validated search request.
///
/// Serializes to the `query` echo of the response: defaults resolved, absent
/// options omitted, `output_format` excluded.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    #[serde(rename = "site_name")]
    pub sites: Vec<Site>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search_term: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub distance: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,

    pub results_wanted: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_old: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub easy_apply: Option<bool>,

    pub description_format: DescriptionFormat,

    pub offset: usize,

    pub linkedin_fetch_description: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_company_ids: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_indeed: Option<String>,

    pub enforce_annual_salary: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxies: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip)]
    pub output_format: OutputFormat,
}

impl SearchQuery {
    /// The parameter echo included in responses.
    pub fn echo(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// End of the `offset..offset+results_wanted` result window.
    pub fn window_end(&self) -> usize {
        self.offset.saturating_add(self.results_wanted)
    }

    /// Apply the result window to a board's filtered entries.
    pub fn window<T>(&self, entries: Vec<T>) -> Vec<T> {
        entries
            .into_iter()
            .skip(self.offset)
            .take(self.results_wanted)
            .collect()
    }
}

/// Description rendering requested from the upstream scraper.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionFormat {
    #[default]
    Markdown,
    Html,
}

impl FromStr for DescriptionFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(()),
        }
    }
}

/// Response encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(()),
        }
    }
}

fn truthy(value: &str) -> bool {
    TRUTHY.contains(&value.to_lowercase().as_str())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Split a comma-separated value, dropping empty entries.
fn csv_strings(value: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() { None } else { Some(parts) }
}

/// Split a comma-separated value into integers, skipping bad entries.
fn csv_ints(value: &str) -> Option<Vec<i64>> {
    let parts: Vec<i64> = value
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    if parts.is_empty() { None } else { Some(parts) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&'static str, &'static str)]) -> SearchParams {
        SearchParams::from_pairs(entries.iter().copied())
    }

    #[test]
    fn from_pairs_coerces_types() {
        let params = pairs(&[
            ("site_name", "indeed, linkedin"),
            ("results_wanted", "3"),
            ("is_remote", "TRUE"),
            ("easy_apply", "no"),
            ("linkedin_company_ids", "1441,oops,2382"),
        ]);
        assert_eq!(
            params.site_name,
            Some(vec!["indeed".to_string(), "linkedin".to_string()])
        );
        assert_eq!(params.results_wanted, Some(3));
        assert_eq!(params.is_remote, Some(true));
        assert_eq!(params.easy_apply, Some(false));
        assert_eq!(params.linkedin_company_ids, Some(vec![1441, 2382]));
    }

    #[test]
    fn from_pairs_skips_empty_and_unknown() {
        let params = pairs(&[("search_term", "  "), ("nonsense", "x"), ("offset", "abc")]);
        assert!(params.search_term.is_none());
        assert!(params.offset.is_none());
    }

    #[test]
    fn body_overrides_query() {
        let query = pairs(&[("results_wanted", "10"), ("search_term", "qa engineer")]);
        let body: SearchParams =
            serde_json::from_str(r#"{"results_wanted": 2, "location": "Chicago"}"#).unwrap();
        let merged = body.merged_over(query);
        assert_eq!(merged.results_wanted, Some(2));
        assert_eq!(merged.search_term.as_deref(), Some("qa engineer"));
        assert_eq!(merged.location.as_deref(), Some("Chicago"));
    }

    #[test]
    fn body_lists_are_arrays_not_csv() {
        let body: SearchParams =
            serde_json::from_str(r#"{"site_name": ["indeed", "linkedin"]}"#).unwrap();
        assert_eq!(
            body.site_name,
            Some(vec!["indeed".to_string(), "linkedin".to_string()])
        );
        // CSV coercion applies to querystrings only
        assert!(serde_json::from_str::<SearchParams>(r#"{"site_name": "indeed,linkedin"}"#).is_err());
    }

    #[test]
    fn validate_applies_defaults() {
        let query = SearchParams::default().validate().unwrap();
        assert_eq!(query.sites.len(), Site::all().len());
        assert_eq!(query.results_wanted, 15);
        assert_eq!(query.distance, 50);
        assert_eq!(query.offset, 0);
        assert_eq!(query.description_format, DescriptionFormat::Markdown);
        assert_eq!(query.output_format, OutputFormat::Json);
        assert!(!query.enforce_annual_salary);
    }

    #[test]
    fn validate_rejects_unknown_site() {
        let params = pairs(&[("site_name", "fakeboard")]);
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("fakeboard"));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn validate_rejects_bad_job_type() {
        let params = pairs(&[("job_type", "gig")]);
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("gig"));
        assert!(err.to_string().contains("fulltime"));
    }

    #[test]
    fn validate_rejects_bad_description_format() {
        let params = pairs(&[("description_format", "pdf")]);
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn validate_rejects_bad_output_format() {
        let params = pairs(&[("output_format", "excel")]);
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_hours_old_is_absent() {
        let params = pairs(&[("hours_old", "0")]);
        assert_eq!(params.validate().unwrap().hours_old, None);
    }

    #[test]
    fn echo_resolves_defaults_and_skips_absent() {
        let params = pairs(&[("site_name", "remoteok"), ("results_wanted", "2")]);
        let echo = params.validate().unwrap().echo();
        assert_eq!(echo["results_wanted"], 2);
        assert_eq!(echo["distance"], 50);
        assert_eq!(echo["site_name"], serde_json::json!(["remoteok"]));
        assert_eq!(echo["description_format"], "markdown");
        assert!(echo.get("search_term").is_none());
        assert!(echo.get("output_format").is_none());
    }

    #[test]
    fn window_applies_offset_and_limit() {
        let params = pairs(&[("offset", "2"), ("results_wanted", "2")]);
        let query = params.validate().unwrap();
        assert_eq!(query.window(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert_eq!(query.window_end(), 4);
    }
}

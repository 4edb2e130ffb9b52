// src/api/mod.rs

//! HTTP surface of the job search API.
//!
//! Routes Lambda HTTP events: parameter parsing/merging happens here, the
//! fan-out lives in [`crate::search`].

use std::sync::Arc;

use lambda_http::http::{Method, StatusCode, header};
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::json;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::models::{Config, OutputFormat, SearchParams, SearchQuery};
use crate::output;
use crate::search::JobSearcher;
use crate::sites::Site;
use crate::{SERVICE_NAME, VERSION};

/// Shared state built once per Lambda container.
pub struct AppState {
    searcher: JobSearcher,
}

impl AppState {
    /// Build state from environment configuration.
    pub fn init() -> Result<Self> {
        let config = Config::from_env();
        config.validate()?;
        Ok(Self {
            searcher: JobSearcher::new(Arc::new(config))?,
        })
    }
}

/// Route one HTTP event to a handler.
pub async fn route(
    state: &AppState,
    request: Request,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let method = request.method().clone();
    let path = request.uri().path().trim_end_matches('/').to_string();

    info!("{} {}", method, request.uri().path());

    match (method, path.as_str()) {
        (Method::GET, "") => reference(),
        (Method::GET, "/api/health") => health(),
        (Method::GET, "/api/sites") => sites(),
        (Method::GET | Method::POST, "/api/jobs") => jobs(state, request).await,
        _ => json_response(StatusCode::NOT_FOUND, &json!({ "error": "Not found" })),
    }
}

/// GET/POST /api/jobs — run the search.
async fn jobs(
    state: &AppState,
    request: Request,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let query = match parse_request(&request) {
        Ok(query) => query,
        Err(e) => {
            return json_response(
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_REQUEST),
                &json!({ "error": e.to_string() }),
            );
        }
    };

    match state.searcher.run(&query).await {
        Ok(outcome) => {
            if outcome.source_failures > 0 {
                info!("{} source(s) failed and were skipped", outcome.source_failures);
            }
            match query.output_format {
                OutputFormat::Json => {
                    json_response(StatusCode::OK, &output::json_payload(&outcome))
                }
                OutputFormat::Csv => match output::to_csv(&outcome.jobs) {
                    Ok(csv) => csv_response(csv),
                    Err(e) => error_response(&e, &query),
                },
            }
        }
        Err(e) => {
            error!("search failed: {}", e);
            error_response(&e, &query)
        }
    }
}

/// Merge querystring and body into a validated query. Body values win.
fn parse_request(request: &Request) -> Result<SearchQuery> {
    let from_query = SearchParams::from_pairs(request.query_string_parameters().iter());

    let from_body = match request.body() {
        Body::Empty => SearchParams::default(),
        Body::Text(text) if text.trim().is_empty() => SearchParams::default(),
        Body::Text(text) => serde_json::from_str(text)
            .map_err(|e| AppError::invalid_param(format!("Invalid JSON body: {e}")))?,
        Body::Binary(bytes) => serde_json::from_slice(bytes)
            .map_err(|e| AppError::invalid_param(format!("Invalid JSON body: {e}")))?,
    };

    from_body.merged_over(from_query).validate()
}

/// GET / — machine-readable API reference.
fn reference() -> std::result::Result<Response<Body>, lambda_http::Error> {
    let doc = json!({
        "name": SERVICE_NAME,
        "version": VERSION,
        "description": "Aggregate job postings from multiple job boards into one schema",
        "endpoints": {
            "GET /": "this reference",
            "GET /api/health": "health check",
            "GET /api/sites": "list supported job boards",
            "GET /api/jobs": "search jobs (querystring parameters)",
            "POST /api/jobs": "search jobs (JSON body; overrides querystring)",
        },
        "parameters": {
            "site_name": "comma-separated boards (default: all)",
            "search_term": "search keywords",
            "google_search_term": "verbatim query for Google Jobs",
            "location": "location filter, e.g. \"New York, NY\"",
            "distance": "search radius in miles (default 50)",
            "job_type": "fulltime | parttime | internship | contract",
            "is_remote": "true | false",
            "results_wanted": "results per board (default 15)",
            "hours_old": "only postings newer than this many hours",
            "easy_apply": "true | false",
            "description_format": "markdown | html (default markdown)",
            "offset": "pagination offset (default 0)",
            "linkedin_fetch_description": "true | false",
            "linkedin_company_ids": "comma-separated LinkedIn company ids",
            "country_indeed": "country for Indeed/Glassdoor, e.g. USA",
            "enforce_annual_salary": "true | false",
            "proxies": "comma-separated proxy URLs",
            "user_agent": "override the scraper User-Agent",
            "output_format": "json | csv (default json)",
        },
        "response_schema": {
            "jobs": "array of normalized job records",
            "count": "number of jobs returned",
            "sites": "boards that were queried",
            "query": "effective parameters after defaults",
        },
    });
    json_response(StatusCode::OK, &doc)
}

/// GET /api/health
fn health() -> std::result::Result<Response<Body>, lambda_http::Error> {
    json_response(
        StatusCode::OK,
        &json!({ "status": "ok", "service": SERVICE_NAME, "version": VERSION }),
    )
}

/// GET /api/sites
fn sites() -> std::result::Result<Response<Body>, lambda_http::Error> {
    let names: Vec<&str> = Site::all().iter().map(Site::as_str).collect();
    json_response(StatusCode::OK, &json!({ "sites": names }))
}

fn error_response(
    error: &AppError,
    query: &SearchQuery,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(
        status,
        &json!({ "error": error.to_string(), "parameters": query.echo() }),
    )
}

fn json_response(
    status: StatusCode,
    body: &serde_json::Value,
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn csv_response(csv: String) -> std::result::Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=jobs.csv",
        )
        .body(Body::from(csv))?)
}

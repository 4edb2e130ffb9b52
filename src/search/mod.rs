// src/search/mod.rs

//! Search fan-out.
//!
//! Dispatches one request to every requested board source concurrently and
//! flattens the normalized results in a deterministic order.

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, Job, SearchQuery};
use crate::sites::{
    Arbeitnow, JobSource, Jobicy, RemoteOk, Remotive, Site, SiteKind, UpstreamSource,
};
use crate::utils::http;

/// Result of one search request.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Normalized jobs, upstream block first, then public-API boards in
    /// requested order
    pub jobs: Vec<Job>,

    /// Boards the request asked for
    pub sites: Vec<Site>,

    /// Echo of the effective parameters
    pub query: serde_json::Value,

    /// Number of sources that failed and were skipped
    pub source_failures: usize,
}

/// Service that fans a query out to board sources.
pub struct JobSearcher {
    config: Arc<Config>,
    client: Client,
}

impl JobSearcher {
    /// Create a searcher with an HTTP client built from the configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_async_client(&config.http)?;
        Ok(Self { config, client })
    }

    /// Run one search request.
    pub async fn run(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let sources = self.build_sources(query);
        let (jobs, source_failures) = self.collect(&sources, query).await?;

        Ok(SearchOutcome {
            jobs,
            sites: query.sites.clone(),
            query: query.echo(),
            source_failures,
        })
    }

    /// Map the requested boards onto sources: one upstream call covering all
    /// scraper-backed boards, plus one adapter per public-API board.
    /// Duplicate board names collapse to a single source. A missing upstream
    /// URL surfaces as a fetch error, handled by the tolerance policy.
    fn build_sources(&self, query: &SearchQuery) -> Vec<Box<dyn JobSource>> {
        let mut seen = HashSet::new();
        let mut upstream_sites = Vec::new();
        let mut public_sites = Vec::new();
        for site in &query.sites {
            if !seen.insert(*site) {
                continue;
            }
            match site.kind() {
                SiteKind::Upstream => upstream_sites.push(*site),
                SiteKind::PublicApi => public_sites.push(*site),
            }
        }

        let mut sources: Vec<Box<dyn JobSource>> = Vec::new();
        if !upstream_sites.is_empty() {
            sources.push(Box::new(UpstreamSource::new(
                upstream_sites,
                &self.config.upstream,
            )));
        }
        for site in public_sites {
            sources.push(match site {
                Site::Arbeitnow => Box::new(Arbeitnow),
                Site::Jobicy => Box::new(Jobicy),
                Site::RemoteOk => Box::new(RemoteOk),
                Site::Remotive => Box::new(Remotive),
                _ => unreachable!("non-public site in public partition"),
            });
        }
        sources
    }

    /// Fetch from all sources concurrently, bounded by the configured
    /// concurrency, preserving source order in the flattened output.
    ///
    /// A public-API source failure is logged and skipped. An upstream
    /// failure fails the whole request only when it is the sole source, so
    /// its status can be forwarded to the caller.
    async fn collect(
        &self,
        sources: &[Box<dyn JobSource>],
        query: &SearchQuery,
    ) -> Result<(Vec<Job>, usize)> {
        let concurrency = self.config.http.max_concurrent.max(1);
        let tolerate_fatal = sources.len() > 1;

        let mut slots: Vec<Vec<Job>> = (0..sources.len()).map(|_| Vec::new()).collect();
        let mut failures = 0;

        // Build boxed futures eagerly (they stay lazy until polled). Keeping
        // the mapping closure out of the stream's state machine and erasing
        // the async block type sidesteps a rustc "implementation of `FnOnce`
        // is not general enough" error (rust-lang/rust#89976) when this
        // future is driven through lambda_http's service bounds.
        let fetches: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                async move {
                    let result = source.fetch(&self.client, query).await;
                    (index, source, result)
                }
                .boxed()
            })
            .collect();
        let mut results = stream::iter(fetches).buffer_unordered(concurrency);

        while let Some((index, source, result)) = results.next().await {
            match result {
                Ok(jobs) => {
                    log::info!("{}: {} jobs", source.label(), jobs.len());
                    slots[index] = jobs;
                }
                Err(error) if source.failure_is_fatal() && !tolerate_fatal => {
                    return Err(error);
                }
                Err(error) => {
                    failures += 1;
                    log::warn!("{} failed, skipping: {}", source.label(), error);
                }
            }
        }

        Ok((slots.into_iter().flatten().collect(), failures))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::SearchParams;

    fn searcher() -> JobSearcher {
        JobSearcher::new(Arc::new(Config::default())).unwrap()
    }

    fn query(pairs: &[(&'static str, &'static str)]) -> SearchQuery {
        SearchParams::from_pairs(pairs.iter().copied())
            .validate()
            .unwrap()
    }

    /// Source stub that never touches the network.
    struct Fixed {
        label: &'static str,
        fatal: bool,
        result: std::result::Result<Vec<&'static str>, u16>,
    }

    #[async_trait]
    impl JobSource for Fixed {
        fn label(&self) -> String {
            self.label.to_string()
        }

        fn failure_is_fatal(&self) -> bool {
            self.fatal
        }

        async fn fetch(&self, _client: &Client, _query: &SearchQuery) -> Result<Vec<Job>> {
            match &self.result {
                Ok(titles) => Ok(titles
                    .iter()
                    .map(|t| {
                        let mut job = Job::for_site(self.label);
                        job.title = Some((*t).to_string());
                        job
                    })
                    .collect()),
                Err(status) => Err(AppError::upstream(self.label, *status, "boom")),
            }
        }
    }

    fn boxed(source: Fixed) -> Box<dyn JobSource> {
        Box::new(source)
    }

    #[tokio::test]
    async fn collect_preserves_source_order() {
        let sources = vec![
            boxed(Fixed {
                label: "a",
                fatal: false,
                result: Ok(vec!["first"]),
            }),
            boxed(Fixed {
                label: "b",
                fatal: false,
                result: Ok(vec!["second", "third"]),
            }),
        ];
        let (jobs, failures) = searcher().collect(&sources, &query(&[])).await.unwrap();
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_deref().unwrap()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert_eq!(failures, 0);
    }

    #[tokio::test]
    async fn public_failure_is_tolerated() {
        let sources = vec![
            boxed(Fixed {
                label: "broken",
                fatal: false,
                result: Err(500),
            }),
            boxed(Fixed {
                label: "ok",
                fatal: false,
                result: Ok(vec!["kept"]),
            }),
        ];
        let (jobs, failures) = searcher().collect(&sources, &query(&[])).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn sole_fatal_failure_propagates() {
        let sources = vec![boxed(Fixed {
            label: "upstream",
            fatal: true,
            result: Err(429),
        })];
        let err = searcher().collect(&sources, &query(&[])).await.unwrap_err();
        assert_eq!(err.http_status(), 429);
    }

    #[tokio::test]
    async fn fatal_failure_tolerated_alongside_other_sources() {
        let sources = vec![
            boxed(Fixed {
                label: "upstream",
                fatal: true,
                result: Err(429),
            }),
            boxed(Fixed {
                label: "remoteok",
                fatal: false,
                result: Ok(vec!["kept"]),
            }),
        ];
        let (jobs, failures) = searcher().collect(&sources, &query(&[])).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(failures, 1);
    }

    #[test]
    fn build_sources_partitions_and_dedupes() {
        let mut config = Config::default();
        config.upstream.url = Some("http://scraper.internal:8000".to_string());
        let searcher = JobSearcher::new(Arc::new(config)).unwrap();

        let query = query(&[("site_name", "indeed,remoteok,indeed,linkedin,jobicy")]);
        let sources = searcher.build_sources(&query);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].label(), "indeed,linkedin");
        assert_eq!(sources[1].label(), "remoteok");
        assert_eq!(sources[2].label(), "jobicy");
    }

    #[tokio::test]
    async fn unconfigured_upstream_fails_when_sole_source() {
        let query = query(&[("site_name", "indeed")]);
        let searcher = searcher();
        let sources = searcher.build_sources(&query);
        let err = searcher.collect(&sources, &query).await.unwrap_err();
        assert!(err.to_string().contains("upstream.url"));
    }

    #[tokio::test]
    async fn unconfigured_upstream_is_skipped_alongside_other_sources() {
        let query = query(&[("site_name", "indeed")]);
        let searcher = searcher();
        let mut sources = searcher.build_sources(&query);
        sources.push(boxed(Fixed {
            label: "remoteok",
            fatal: false,
            result: Ok(vec!["kept"]),
        }));

        let (jobs, failures) = searcher.collect(&sources, &query).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("kept"));
        assert_eq!(failures, 1);
    }
}

//! jobfan CLI
//!
//! Local execution entry point. For AWS Lambda, use `jobfan-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobfan::{
    error::Result,
    models::{Config, OutputFormat, SearchParams},
    output,
    search::JobSearcher,
    sites::Site,
};

/// jobfan - Job Search Aggregator
#[derive(Parser, Debug)]
#[command(name = "jobfan", version, about = "Fan a job search out to multiple boards")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a search and print the results
    Search {
        /// Comma-separated boards (default: all)
        #[arg(long)]
        site: Option<String>,

        /// Search keywords
        #[arg(long)]
        search_term: Option<String>,

        /// Verbatim query for Google Jobs
        #[arg(long)]
        google_search_term: Option<String>,

        /// Location filter, e.g. "New York, NY"
        #[arg(long)]
        location: Option<String>,

        /// Search radius in miles
        #[arg(long)]
        distance: Option<u32>,

        /// fulltime | parttime | internship | contract
        #[arg(long)]
        job_type: Option<String>,

        /// true | false
        #[arg(long)]
        is_remote: Option<String>,

        /// Results per board
        #[arg(long)]
        results_wanted: Option<usize>,

        /// Only postings newer than this many hours
        #[arg(long)]
        hours_old: Option<i64>,

        /// Pagination offset
        #[arg(long)]
        offset: Option<usize>,

        /// Country for Indeed/Glassdoor, e.g. USA
        #[arg(long)]
        country_indeed: Option<String>,

        /// Comma-separated LinkedIn company ids
        #[arg(long)]
        linkedin_company_ids: Option<String>,

        /// json | csv
        #[arg(long, default_value = "json")]
        output: String,
    },

    /// List supported job boards
    Sites,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Search {
            site,
            search_term,
            google_search_term,
            location,
            distance,
            job_type,
            is_remote,
            results_wanted,
            hours_old,
            offset,
            country_indeed,
            linkedin_company_ids,
            output,
        } => {
            // Reuse the querystring coercion so the CLI accepts exactly what
            // the HTTP surface accepts.
            let mut pairs: Vec<(&str, String)> = vec![("output_format", output)];
            let mut push = |key: &'static str, value: Option<String>| {
                if let Some(value) = value {
                    pairs.push((key, value));
                }
            };
            push("site_name", site);
            push("search_term", search_term);
            push("google_search_term", google_search_term);
            push("location", location);
            push("distance", distance.map(|v| v.to_string()));
            push("job_type", job_type);
            push("is_remote", is_remote);
            push("results_wanted", results_wanted.map(|v| v.to_string()));
            push("hours_old", hours_old.map(|v| v.to_string()));
            push("offset", offset.map(|v| v.to_string()));
            push("country_indeed", country_indeed);
            push("linkedin_company_ids", linkedin_company_ids);

            let query =
                SearchParams::from_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str()))).validate()?;

            let searcher = JobSearcher::new(Arc::new(config))?;
            let outcome = searcher.run(&query).await?;

            log::info!(
                "{} jobs from {} board(s), {} source failure(s)",
                outcome.jobs.len(),
                outcome.sites.len(),
                outcome.source_failures
            );

            match query.output_format {
                OutputFormat::Json => {
                    let payload = output::json_payload(&outcome);
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Csv => print!("{}", output::to_csv(&outcome.jobs)?),
            }
        }

        Command::Sites => {
            for site in Site::all() {
                let kind = match site.kind() {
                    jobfan::sites::SiteKind::Upstream => "upstream scraper",
                    jobfan::sites::SiteKind::PublicApi => "public API",
                };
                println!("{:<16} {}", site.as_str(), kind);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            if config.upstream.url.is_none() {
                log::warn!(
                    "upstream.url is not set; scraper-backed boards will be unavailable"
                );
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}

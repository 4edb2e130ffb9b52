// src/models/mod.rs

//! Domain models for the job search API.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod job;
mod query;

// Re-export all public types
pub use config::{Config, HttpConfig, UpstreamConfig};
pub use job::{Job, JobType, Location, Salary};
pub use query::{DescriptionFormat, OutputFormat, SearchParams, SearchQuery};

// src/lib.rs

//! jobfan — job search fan-out library

#[cfg(feature = "lambda")]
pub mod api;
pub mod error;
pub mod models;
pub mod output;
pub mod search;
pub mod sites;
pub mod utils;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "jobfan";

/// Crate version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// src/bin/lambda.rs

//! Lambda entry point for the jobfan API.

use std::sync::Arc;

use lambda_http::{Error, run, service_fn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobfan::api::{AppState, route};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for Lambda
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("jobfan Lambda starting...");

    let state = Arc::new(AppState::init()?);

    run(service_fn(move |request| {
        let state = Arc::clone(&state);
        async move { route(&state, request).await }
    }))
    .await
}

//! # Job Aggregator
//!
//! A batch job that collects job postings from recruiting sites, normalizes
//! them into one schema, removes duplicates across sources and writes a single
//! JSON document for display code to consume.
//!
//! ## Features
//!
//! - Scrapes listings from ACBAR and jobs.af
//! - Two-pass crawling: listing page, then each posting's detail page
//! - Date normalization to ISO `YYYY-MM-DD`
//! - Cross-source deduplication on title and organization
//! - A failing source never takes the others down; the report always keeps
//!   its schema, with `error`/`warning` explaining degraded runs
//!
//! ## Usage
//!
//! ```sh
//! job_aggregator -o ./jobs-data.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Extraction**: Each source adapter reads its listing (and detail pages)
//!    concurrently with the other adapters
//! 2. **Normalization**: Fields are cleaned and defaulted as records are built
//! 3. **Deduplication**: Records from all sources are merged, first one wins
//! 4. **Output**: The report is written atomically to the JSON file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod dedup;
mod error;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod utils;

use aggregator::{Aggregator, failure_report};
use cli::Cli;
use config::AggregatorConfig;
use fetch::HttpBrowser;
use models::AggregationReport;
use outputs::json;
use utils::{ensure_writable_parent, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("job_aggregator starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.config, "Parsed CLI arguments");

    // Early check: the report has to land somewhere
    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output,
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let report = build_report(args.config.as_deref()).await;

    json::write_report(&report, &args.output).await?;

    let elapsed = start_time.elapsed();
    if let Some(warning) = &report.warning {
        warn!(warning = %truncate_for_log(warning, 500), "Run degraded");
    }
    info!(
        ?elapsed,
        total = report.total_count,
        sources = ?report.sources,
        "Execution complete"
    );

    match report.error {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

/// Load settings and run the aggregation. Setup failures still produce a
/// report so the output file is always replaced with a valid document.
async fn build_report(config_path: Option<&str>) -> AggregationReport {
    let config = match AggregatorConfig::load(config_path).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return failure_report(&format!("configuration error: {e}"));
        }
    };

    let browser = match HttpBrowser::new(&config) {
        Ok(browser) => browser,
        Err(e) => {
            error!(error = %e, "Failed to set up HTTP client");
            return failure_report(&e.to_string());
        }
    };

    let today = Local::now().date_naive();
    Aggregator::from_config(browser, &config).run(today).await
}

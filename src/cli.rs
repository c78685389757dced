//! Command-line interface definitions for the job aggregator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.

use crate::outputs::json::DEFAULT_OUTPUT_PATH;
use clap::Parser;

/// Command-line arguments for the job aggregator.
///
/// # Examples
///
/// ```sh
/// # Write ./jobs-data.json with built-in settings
/// job_aggregator
///
/// # Custom output path and config file
/// job_aggregator -o /srv/site/data/jobs-data.json -c aggregator.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON report
    #[arg(short, long, env = "JOBS_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: String,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "JOBS_CONFIG")]
    pub config: Option<String>,
}

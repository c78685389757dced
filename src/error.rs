//! Error types for source adapters and the aggregation pipeline.
//!
//! Only adapter-level and pipeline-level failures are modelled here. Record-level defects never
//! become errors: missing optional fields get defaults, records without a
//! title or link are dropped, and failed detail pages degrade the record.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid CSS selector {selector}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("{site} adapter panicked")]
    Panicked { site: &'static str },
}

/// Failures that escape every adapter's isolation and sink the whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("all sources failed: {0}")]
    AllSourcesFailed(String),

    #[error("aggregation panicked: {0}")]
    Panicked(String),
}

impl ScrapeError {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        ScrapeError::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

//! Data models for job postings and the aggregation report.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Source`]: The fixed set of recruiting sites the aggregator knows about
//! - [`JobPosting`]: One normalized job record, the unit of the output
//! - [`AggregationReport`]: The document written once per run
//!
//! The serialized field names use camelCase to match the JSON consumed by the
//! display code, hence the `#[serde(rename_all = "camelCase")]` attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A known recruiting site.
///
/// Variants are listed in aggregation order; [`Source::ALL`] is the order in
/// which adapter output is concatenated before deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Source {
    #[serde(rename = "acbar")]
    Acbar,
    #[serde(rename = "jobsaf")]
    JobsAf,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Acbar, Source::JobsAf];

    /// Identifier written into each posting's `source` field.
    pub fn site(&self) -> &'static str {
        match self {
            Source::Acbar => "acbar.org",
            Source::JobsAf => "jobs.af",
        }
    }

    /// Key used in the report's `sources` map and as the id prefix.
    pub fn key(&self) -> &'static str {
        match self {
            Source::Acbar => "acbar",
            Source::JobsAf => "jobsaf",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.site())
    }
}

/// A normalized job posting.
///
/// `title` and `source_url` are never empty for a posting that exists;
/// adapters drop candidates that cannot fill them. Dates are ISO
/// `YYYY-MM-DD`, and `deadline` is empty when unknown.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    /// Unique within one run, not stable across runs.
    pub id: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    /// Employment type, e.g. "Full-time".
    #[serde(rename = "type")]
    pub job_type: String,
    pub category: String,
    pub posted_date: String,
    pub deadline: String,
    /// Site identifier, see [`Source::site`].
    pub source: String,
    /// Absolute URL of the posting on the source site.
    pub source_url: String,
    pub description: String,
    pub requirements: Vec<String>,
}

/// The document written at the end of every run.
///
/// The schema is the same whether the run succeeded, partly failed or
/// failed entirely; only the content degrades.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub jobs: Vec<JobPosting>,
    /// RFC 3339 timestamp taken when the report was assembled.
    pub last_updated: String,
    pub total_count: usize,
    /// Records contributed per source before deduplication.
    pub sources: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
}

/// A `sources` map with every known source set to zero.
pub fn zeroed_sources() -> BTreeMap<String, usize> {
    Source::ALL
        .iter()
        .map(|s| (s.key().to_string(), 0))
        .collect()
}

//! Run every source adapter and assemble the report.
//!
//! Adapters run concurrently and independently. A failing adapter (an
//! error, or even a panic) contributes nothing and is named in the report's
//! `warning`; its siblings are unaffected. Only when no adapter produced
//! anything, or something breaks outside the adapters, does the run count as
//! failed, and even then the report keeps its full schema with an `error`.
//!
//! `sources` counts are taken before deduplication, so their sum can exceed
//! `totalCount`.

use crate::config::AggregatorConfig;
use crate::dedup::dedupe;
use crate::error::{PipelineError, ScrapeError};
use crate::fetch::Browser;
use crate::models::{AggregationReport, Source, zeroed_sources};
use crate::scrapers::{Harvest, SourceAdapter};
use chrono::{NaiveDate, SecondsFormat, Utc};
use futures::FutureExt;
use futures::future::join_all;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, instrument, warn};

/// Warning attached to a report for a failed run.
pub const FAILURE_WARNING: &str = "Failed to scrape job data. The websites may be using dynamic loading or have changed their structure.";

/// An adapter that produced nothing because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: Source,
    pub reason: String,
}

pub struct Aggregator<B> {
    browser: B,
    adapters: Vec<SourceAdapter>,
    /// Adapters that could not even be built.
    broken: Vec<SourceFailure>,
}

impl<B: Browser> Aggregator<B> {
    pub fn new(browser: B, adapters: Vec<SourceAdapter>) -> Self {
        Self {
            browser,
            adapters,
            broken: Vec::new(),
        }
    }

    /// Build one adapter per enabled source, in aggregation order.
    pub fn from_config(browser: B, config: &AggregatorConfig) -> Self {
        let mut adapters = Vec::new();
        let mut broken = Vec::new();
        for source in Source::ALL {
            let settings = config.source(source);
            if !settings.enabled {
                info!(%source, "Source disabled");
                continue;
            }
            match SourceAdapter::new(source, settings) {
                Ok(adapter) => adapters.push(adapter),
                Err(e) => {
                    error!(%source, error = %e, "Could not build adapter");
                    broken.push(SourceFailure {
                        source,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Self {
            broken,
            ..Self::new(browser, adapters)
        }
    }

    /// Run all adapters and build the report. Never fails: a failed run
    /// yields a report with `error` set.
    #[instrument(level = "info", skip_all, fields(%today))]
    pub async fn run(&self, today: NaiveDate) -> AggregationReport {
        settle(self.collect(today)).await
    }

    async fn collect(&self, today: NaiveDate) -> Result<AggregationReport, PipelineError> {
        let runs = self.adapters.iter().map(|adapter| {
            let source = adapter.source();
            AssertUnwindSafe(adapter.extract(&self.browser, today))
                .catch_unwind()
                .map(move |outcome| match outcome {
                    Ok(Ok(harvest)) => Ok(harvest),
                    Ok(Err(e)) => Err(SourceFailure {
                        source,
                        reason: e.to_string(),
                    }),
                    Err(_) => Err(SourceFailure {
                        source,
                        reason: ScrapeError::Panicked {
                            site: source.site(),
                        }
                        .to_string(),
                    }),
                })
        });
        let results = join_all(runs).await;

        let mut harvests = Vec::new();
        let mut failures = self.broken.clone();
        for result in results {
            match result {
                Ok(harvest) => harvests.push(harvest),
                Err(failure) => {
                    warn!(source = %failure.source, reason = %failure.reason, "Source failed; continuing without it");
                    failures.push(failure);
                }
            }
        }

        if harvests.is_empty() && !failures.is_empty() {
            let reasons = failures
                .iter()
                .map(|f| format!("{}: {}", f.source, f.reason))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PipelineError::AllSourcesFailed(reasons));
        }

        Ok(assemble(harvests, &failures))
    }
}

/// Await a pipeline run, turning an error or a panic into a failure report.
async fn settle<F>(work: F) -> AggregationReport
where
    F: Future<Output = Result<AggregationReport, PipelineError>>,
{
    let failure = match AssertUnwindSafe(work).catch_unwind().await {
        Ok(Ok(report)) => return report,
        Ok(Err(e)) => e,
        Err(panic) => PipelineError::Panicked(panic_message(panic.as_ref())),
    };
    error!(error = %failure, "Aggregation failed");
    failure_report(&failure.to_string())
}

/// Merge harvests in source order, deduplicate and stamp the report.
fn assemble(mut harvests: Vec<Harvest>, failures: &[SourceFailure]) -> AggregationReport {
    harvests.sort_by_key(|h| h.source);

    let mut sources = zeroed_sources();
    for harvest in &harvests {
        sources.insert(harvest.source.key().to_string(), harvest.len());
    }
    let warning = compose_warning(&harvests, failures);

    let combined: Vec<_> = harvests.into_iter().flat_map(Harvest::into_postings).collect();
    let combined_len = combined.len();
    let deduped = dedupe(combined);

    info!(
        combined = combined_len,
        unique = deduped.jobs.len(),
        duplicates = deduped.duplicates.len(),
        "Merged sources"
    );

    AggregationReport {
        total_count: deduped.jobs.len(),
        jobs: deduped.jobs,
        last_updated: timestamp(),
        sources,
        error: None,
        warning,
    }
}

fn compose_warning(harvests: &[Harvest], failures: &[SourceFailure]) -> Option<String> {
    let mut notes = Vec::new();
    for failure in failures {
        notes.push(format!("{} failed: {}", failure.source, failure.reason));
    }
    for harvest in harvests {
        let partial = harvest.partial_count();
        if partial > 0 {
            notes.push(format!(
                "{}: {} postings have listing fields only (detail page failed)",
                harvest.source, partial
            ));
        }
        if harvest.used_fallback {
            notes.push(format!(
                "{}: records found with the fallback selector",
                harvest.source
            ));
        }
        if harvest.unparsed_dates > 0 {
            notes.push(format!(
                "{}: {} dates could not be read",
                harvest.source, harvest.unparsed_dates
            ));
        }
    }
    (!notes.is_empty()).then(|| notes.join("; "))
}

/// The report for a failed run: no jobs, every count zero, `error` set.
pub fn failure_report(message: &str) -> AggregationReport {
    AggregationReport {
        jobs: Vec::new(),
        last_updated: timestamp(),
        total_count: 0,
        sources: zeroed_sources(),
        error: Some(message.to_string()),
        warning: Some(FAILURE_WARNING.to_string()),
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Cross-source deduplication.
//!
//! Two postings are the same job when their titles and organizations match
//! ignoring case and whitespace. The first posting under a key wins and later
//! ones are dropped whole, never merged. Dropped postings are returned so the
//! run can log which URLs were folded into which.

use crate::models::JobPosting;
use crate::normalize::clean_text;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A posting removed because an earlier one had the same identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub key: String,
    pub kept_url: String,
    pub dropped_url: String,
}

#[derive(Debug, Default)]
pub struct Deduped {
    pub jobs: Vec<JobPosting>,
    pub duplicates: Vec<Duplicate>,
}

/// Identity key: lower-cased, whitespace-collapsed `title|organization`.
pub fn identity_key(job: &JobPosting) -> String {
    format!(
        "{}|{}",
        clean_text(&job.title).to_lowercase(),
        clean_text(&job.organization).to_lowercase()
    )
}

/// Remove repeated postings, keeping the first of each and the input order.
#[instrument(level = "info", skip_all, fields(input = jobs.len()))]
pub fn dedupe(jobs: Vec<JobPosting>) -> Deduped {
    let mut kept_at: HashMap<String, usize> = HashMap::with_capacity(jobs.len());
    let mut out = Deduped::default();

    for job in jobs {
        let key = identity_key(&job);
        match kept_at.get(&key) {
            Some(&i) => {
                let duplicate = Duplicate {
                    key,
                    kept_url: out.jobs[i].source_url.clone(),
                    dropped_url: job.source_url,
                };
                debug!(
                    key = %duplicate.key,
                    kept = %duplicate.kept_url,
                    dropped = %duplicate.dropped_url,
                    "Dropping duplicate posting"
                );
                out.duplicates.push(duplicate);
            }
            None => {
                kept_at.insert(key, out.jobs.len());
                out.jobs.push(job);
            }
        }
    }

    debug!(
        kept = out.jobs.len(),
        dropped = out.duplicates.len(),
        "Deduplicated postings"
    );
    out
}

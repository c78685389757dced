//! Run configuration.
//!
//! Every setting has a built-in default, so a run needs no configuration at
//! all. An optional YAML file can override any of them:
//!
//! ```yaml
//! user_agent: "job_aggregator/0.1 (+https://example.org/bot)"
//! timeout_secs: 30
//! request_delay_ms: 1000
//! sources:
//!   acbar:
//!     strategy: two-pass
//!     detail_limit: 15
//!   jobsaf:
//!     enabled: false
//! ```

use crate::models::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; job_aggregator/",
    env!("CARGO_PKG_VERSION"),
    "; batch job listing aggregator)"
);

/// How an adapter reads its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Everything comes from the listing page.
    SinglePass,
    /// Listing page first, then a capped number of detail pages.
    TwoPass,
}

/// Per-source overrides as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub enabled: Option<bool>,
    pub strategy: Option<StrategyKind>,
    /// Maximum number of detail pages visited by the two-pass strategy.
    pub detail_limit: Option<usize>,
    /// Overrides the listing page of the site profile.
    pub listing_url: Option<String>,
}

/// Resolved settings for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub enabled: bool,
    pub strategy: StrategyKind,
    pub detail_limit: usize,
    pub listing_url: Option<String>,
}

impl SourceSettings {
    pub fn default_for(source: Source) -> Self {
        let strategy = match source {
            Source::Acbar => StrategyKind::TwoPass,
            Source::JobsAf => StrategyKind::SinglePass,
        };
        Self {
            enabled: true,
            strategy,
            detail_limit: 10,
            listing_url: None,
        }
    }

    fn with_overrides(mut self, overrides: &SourceConfig) -> Self {
        if let Some(enabled) = overrides.enabled {
            self.enabled = enabled;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if let Some(limit) = overrides.detail_limit {
            self.detail_limit = limit;
        }
        if overrides.listing_url.is_some() {
            self.listing_url = overrides.listing_url.clone();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub user_agent: String,
    /// Per-request timeout; a listing request that times out fails its adapter.
    pub timeout_secs: u64,
    /// Pause before every request, plus up to 250ms of jitter.
    pub request_delay_ms: u64,
    pub sources: BTreeMap<Source, SourceConfig>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            request_delay_ms: 1000,
            sources: BTreeMap::new(),
        }
    }
}

impl AggregatorConfig {
    /// Settings for `source`: its defaults with whatever the file overrides.
    pub fn source(&self, source: Source) -> SourceSettings {
        let defaults = SourceSettings::default_for(source);
        match self.sources.get(&source) {
            Some(overrides) => defaults.with_overrides(overrides),
            None => defaults,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load the configuration file at `path`, or the defaults when no path
    /// is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!(
            timeout_secs = config.timeout_secs,
            request_delay_ms = config.request_delay_ms,
            "Loaded configuration"
        );
        Ok(config)
    }
}

//! Page fetching.
//!
//! Adapters never talk to the network directly. They open one [`Page`] from a
//! [`Browser`] and navigate it, so a single session serves the listing page
//! and every detail page of a source. Dropping the page releases the session,
//! which happens on every exit path of an adapter run.
//!
//! [`HttpBrowser`] is the production implementation, a `reqwest` client with
//! a fixed timeout, a descriptive user agent and a short politeness delay
//! before each request.

use crate::config::AggregatorConfig;
use crate::error::ScrapeError;
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// A source of navigable pages.
pub trait Browser {
    type Page: Page;

    /// Open a fresh page for one adapter.
    async fn open_page(&self) -> Result<Self::Page, ScrapeError>;
}

/// A page that can be pointed at a URL and returns the loaded markup.
///
/// Navigation takes `&mut self`: a page loads one URL at a time.
pub trait Page {
    async fn goto(&mut self, url: &str) -> Result<String, ScrapeError>;
}

/// `reqwest`-backed [`Browser`].
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
    delay: Duration,
}

impl HttpBrowser {
    pub fn new(config: &AggregatorConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            delay: config.request_delay(),
        })
    }
}

impl Browser for HttpBrowser {
    type Page = HttpPage;

    async fn open_page(&self) -> Result<HttpPage, ScrapeError> {
        Ok(HttpPage {
            client: self.client.clone(),
            delay: self.delay,
            visits: 0,
        })
    }
}

/// One adapter's session on an [`HttpBrowser`].
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    delay: Duration,
    visits: usize,
}

impl Page for HttpPage {
    #[instrument(level = "debug", skip(self), fields(visit = self.visits))]
    async fn goto(&mut self, url: &str) -> Result<String, ScrapeError> {
        if !self.delay.is_zero() {
            let jitter_ms: u64 = rng().random_range(0..=250);
            sleep(self.delay + Duration::from_millis(jitter_ms)).await;
        }
        self.visits += 1;

        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| ScrapeError::fetch(url, e))?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

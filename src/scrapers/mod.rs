//! Source adapters for recruiting sites.
//!
//! Each supported site is described by a [`SiteProfile`]: where its listing
//! lives, how records are found on it, and an ordered rule table per field
//! (see [`rules`]). A [`SourceAdapter`] runs a profile with one of two
//! strategies:
//!
//! 1. **Single pass**: every field comes from the listing page.
//! 2. **Two pass**: the listing page yields a minimal record (title,
//!    organization, location, dates, link); then the first `detail_limit`
//!    records' detail pages are visited one after another to fill in type,
//!    category, the full description and requirements. A failed detail page
//!    degrades its record to [`Enrichment::Partial`] and never drops it.
//!
//! # Supported Sources
//!
//! | Source | Module | Default strategy | Notes |
//! |--------|--------|------------------|-------|
//! | ACBAR | [`acbar`] | Two pass | `Label: value` rows |
//! | jobs.af | [`jobsaf`] | Single pass | Loose class-substring fallback |
//!
//! # Record Rules
//!
//! - A record needs a title and a link that resolves to an absolute URL;
//!   otherwise it is dropped.
//! - Relative links resolve against the profile's base URL.
//! - The same link seen twice on one listing is kept once.
//! - Ids are `{source}-{position}` plus a slug of the link's last path
//!   segment, so they are unique within a run without reading the clock.

pub mod acbar;
pub mod jobsaf;
pub mod rules;

use crate::config::{SourceSettings, StrategyKind};
use crate::error::ScrapeError;
use crate::fetch::{Browser, Page};
use crate::models::{JobPosting, Source};
use crate::normalize::{normalize_date, normalize_deadline, resolve_url, truncate_description};
use crate::utils::slugify_title;
use chrono::NaiveDate;
use rules::{Field, Node, collect_items};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

const LISTING_DESCRIPTION_CHARS: usize = 200;
const DETAIL_DESCRIPTION_CHARS: usize = 2000;
const ID_SLUG_CHARS: usize = 48;

/// How records are located on a listing page.
#[derive(Debug)]
pub struct ListingLayout {
    /// Selects one element per record.
    pub primary: Selector,
    /// Tried only when `primary` matches nothing.
    pub fallback: Option<Selector>,
    /// Closest ancestor of a record element that holds its other fields.
    /// `None` when the record element is the whole card.
    pub container: Option<Selector>,
}

#[derive(Debug)]
pub struct ListingFields {
    pub title: Field,
    pub link: Field,
    pub organization: Field,
    pub location: Field,
    pub job_type: Field,
    pub category: Field,
    pub posted: Field,
    pub deadline: Field,
    pub description: Field,
}

#[derive(Debug)]
pub struct DetailFields {
    pub job_type: Field,
    pub category: Field,
    pub description: Field,
    pub deadline: Field,
    pub requirements: Selector,
}

/// Everything site-specific about one source.
#[derive(Debug)]
pub struct SiteProfile {
    pub source: Source,
    pub base_url: Url,
    pub listing_url: String,
    pub layout: ListingLayout,
    pub listing: ListingFields,
    pub detail: DetailFields,
}

impl SiteProfile {
    pub fn for_source(source: Source) -> Result<Self, ScrapeError> {
        match source {
            Source::Acbar => acbar::profile(),
            Source::JobsAf => jobsaf::profile(),
        }
    }
}

/// What the detail pass did for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// All fields the strategy reads were read. Single-pass records are
    /// always complete.
    Complete,
    /// The detail page could not be loaded; only listing fields are set.
    Partial { reason: String },
    /// Beyond the detail limit; only listing fields are set.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct Extracted {
    pub posting: JobPosting,
    pub enrichment: Enrichment,
}

/// One adapter's output for a run.
#[derive(Debug)]
pub struct Harvest {
    pub source: Source,
    pub records: Vec<Extracted>,
    /// The fallback record selector was needed to find anything.
    pub used_fallback: bool,
    /// Dates the site printed but we could not read.
    pub unparsed_dates: usize,
    /// Candidates dropped for a missing title or link, or a repeated link.
    pub discarded: usize,
}

impl Harvest {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn partial_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.enrichment, Enrichment::Partial { .. }))
            .count()
    }

    pub fn into_postings(self) -> Vec<JobPosting> {
        self.records.into_iter().map(|r| r.posting).collect()
    }
}

/// A record under construction, before it gets its id.
#[derive(Debug, Clone)]
struct Draft {
    title: String,
    organization: String,
    location: String,
    job_type: String,
    category: String,
    posted_date: String,
    deadline: String,
    source_url: String,
    description: String,
    requirements: Vec<String>,
    /// The site printed a deadline we could not read.
    unreadable_deadline: bool,
}

impl Draft {
    fn into_posting(self, source: Source, position: usize) -> JobPosting {
        JobPosting {
            id: posting_id(source, position, &self.source_url),
            title: self.title,
            organization: self.organization,
            location: self.location,
            job_type: self.job_type,
            category: self.category,
            posted_date: self.posted_date,
            deadline: self.deadline,
            source: source.site().to_string(),
            source_url: self.source_url,
            description: self.description,
            requirements: self.requirements,
        }
    }

    fn apply(&mut self, detail: Detail) {
        self.job_type = detail.job_type;
        self.category = detail.category;
        if let Some(description) = detail.description {
            self.description = truncate_description(&description, DETAIL_DESCRIPTION_CHARS);
        }
        if self.deadline.is_empty() {
            if !detail.deadline.is_empty() {
                self.deadline = detail.deadline;
                self.unreadable_deadline = false;
            } else if detail.unreadable_deadline {
                self.unreadable_deadline = true;
            }
        }
        self.requirements = detail.requirements;
    }
}

fn posting_id(source: Source, position: usize, source_url: &str) -> String {
    let slug = Url::parse(source_url).ok().and_then(|url| {
        let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
        let slug: String = slugify_title(segment).chars().take(ID_SLUG_CHARS).collect();
        (!slug.is_empty()).then_some(slug)
    });
    match slug {
        Some(slug) => format!("{}-{}-{}", source.key(), position, slug),
        None => format!("{}-{}", source.key(), position),
    }
}

fn placeholder_description(title: &str, organization: &str, location: &str) -> String {
    format!("Job opening for {title} at {organization} in {location}.")
}

#[derive(Debug, Default)]
struct Listing {
    drafts: Vec<Draft>,
    used_fallback: bool,
    /// Posted dates only; unreadable deadlines are flagged per draft.
    unparsed_posted: usize,
    discarded: usize,
}

/// The element holding a record's fields.
///
/// Prefer the closest ancestor matching the layout's container selector, as
/// long as it holds no other record. Otherwise take the anchor's parent if
/// it holds only this record, else the anchor itself. `body` and `html` are
/// never a record's scope.
fn record_scope<'a>(
    anchor: ElementRef<'a>,
    layout: &ListingLayout,
    anchors: &Selector,
) -> ElementRef<'a> {
    let Some(container) = &layout.container else {
        return anchor;
    };
    let usable = |e: &ElementRef<'_>| {
        !matches!(e.value().name(), "html" | "body") && e.select(anchors).count() <= 1
    };

    let matched = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| container.matches(e));
    if let Some(found) = matched.filter(usable) {
        return found;
    }

    anchor
        .parent()
        .and_then(ElementRef::wrap)
        .filter(usable)
        .unwrap_or(anchor)
}

/// Read candidate records from a listing page.
///
/// With `minimal` set only the fields the two-pass strategy takes from the
/// listing are read; type and category are left for the detail page.
fn parse_listing(profile: &SiteProfile, html: &str, today: NaiveDate, minimal: bool) -> Listing {
    let document = Html::parse_document(html);
    let layout = &profile.layout;
    let fields = &profile.listing;
    let mut listing = Listing::default();

    let mut anchor_selector = &layout.primary;
    let mut anchors: Vec<ElementRef<'_>> = document.select(anchor_selector).collect();
    if anchors.is_empty() {
        if let Some(fallback) = &layout.fallback {
            anchors = document.select(fallback).collect();
            anchor_selector = fallback;
            listing.used_fallback = !anchors.is_empty();
            if listing.used_fallback {
                warn!(
                    source = %profile.source,
                    candidates = anchors.len(),
                    "Primary selector matched nothing; using fallback heuristic"
                );
            }
        }
    }

    let mut seen = HashSet::new();
    for (index, anchor) in anchors.into_iter().enumerate() {
        let node = Node {
            anchor,
            container: record_scope(anchor, layout, anchor_selector),
        };

        let title = fields.title.resolve(&node);
        let link = fields
            .link
            .first_match(&node)
            .and_then(|href| resolve_url(&profile.base_url, &href));
        let source_url = match link {
            Some(url) if !title.is_empty() => url,
            _ => {
                debug!(index, %title, "Dropping record without title or link");
                listing.discarded += 1;
                continue;
            }
        };
        if !seen.insert(source_url.clone()) {
            debug!(index, %source_url, "Dropping repeated link");
            listing.discarded += 1;
            continue;
        }

        let organization = fields.organization.resolve(&node);
        let location = fields.location.resolve(&node);
        let (job_type, category) = if minimal {
            (String::new(), String::new())
        } else {
            (fields.job_type.resolve(&node), fields.category.resolve(&node))
        };

        let posted = normalize_date(&fields.posted.resolve(&node), today);
        if posted.is_unparsed() {
            listing.unparsed_posted += 1;
        }
        let (deadline, unreadable_deadline) = read_deadline(&fields.deadline, &node);

        let description = match fields.description.first_match(&node) {
            Some(text) => truncate_description(&text, LISTING_DESCRIPTION_CHARS),
            None => placeholder_description(&title, &organization, &location),
        };

        listing.drafts.push(Draft {
            title,
            organization,
            location,
            job_type,
            category,
            posted_date: posted.to_iso(),
            deadline,
            source_url,
            description,
            requirements: Vec::new(),
            unreadable_deadline,
        });
    }

    listing
}

/// A normalized deadline, and whether the raw text was present but
/// unreadable.
fn read_deadline(field: &Field, node: &Node<'_>) -> (String, bool) {
    let raw = field.resolve(node);
    let deadline = normalize_deadline(&raw);
    let unreadable = deadline.is_empty() && !raw.is_empty();
    if unreadable {
        debug!(%raw, "Unreadable deadline");
    }
    (deadline, unreadable)
}

/// Fields read from a detail page.
#[derive(Debug)]
struct Detail {
    job_type: String,
    category: String,
    description: Option<String>,
    deadline: String,
    unreadable_deadline: bool,
    requirements: Vec<String>,
}

fn parse_detail(profile: &SiteProfile, html: &str) -> Detail {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let node = Node::whole(root);
    let fields = &profile.detail;
    let (deadline, unreadable_deadline) = read_deadline(&fields.deadline, &node);

    Detail {
        job_type: fields.job_type.resolve(&node),
        category: fields.category.resolve(&node),
        description: fields.description.first_match(&node),
        deadline,
        unreadable_deadline,
        requirements: collect_items(root, &fields.requirements),
    }
}

/// Runs one [`SiteProfile`] with the configured strategy.
#[derive(Debug)]
pub struct SourceAdapter {
    profile: SiteProfile,
    settings: SourceSettings,
}

impl SourceAdapter {
    pub fn new(source: Source, settings: SourceSettings) -> Result<Self, ScrapeError> {
        let mut profile = SiteProfile::for_source(source)?;
        if let Some(url) = &settings.listing_url {
            profile.listing_url = url.clone();
        }
        Ok(Self { profile, settings })
    }

    pub fn source(&self) -> Source {
        self.profile.source
    }

    /// Extract this source's records.
    ///
    /// Fails only when the listing page cannot be loaded. The page opened
    /// here is dropped before returning, on success or failure.
    #[instrument(level = "info", skip_all, fields(source = %self.profile.source))]
    pub async fn extract<B: Browser>(
        &self,
        browser: &B,
        today: NaiveDate,
    ) -> Result<Harvest, ScrapeError> {
        let mut page = browser.open_page().await?;
        let html = page.goto(&self.profile.listing_url).await?;

        let two_pass = self.settings.strategy == StrategyKind::TwoPass;
        let listing = parse_listing(&self.profile, &html, today, two_pass);
        debug!(
            candidates = listing.drafts.len(),
            fallback = listing.used_fallback,
            "Parsed listing page"
        );

        let mut enriched = Vec::with_capacity(listing.drafts.len());
        for (index, mut draft) in listing.drafts.into_iter().enumerate() {
            let enrichment = if !two_pass {
                Enrichment::Complete
            } else if index >= self.settings.detail_limit {
                Enrichment::Skipped
            } else {
                match page.goto(&draft.source_url).await {
                    Ok(body) => {
                        draft.apply(parse_detail(&self.profile, &body));
                        Enrichment::Complete
                    }
                    Err(e) => {
                        warn!(index, url = %draft.source_url, error = %e, "Detail page failed; keeping listing fields");
                        Enrichment::Partial {
                            reason: e.to_string(),
                        }
                    }
                }
            };
            enriched.push((draft, enrichment));
        }

        let source = self.profile.source;
        let unreadable_deadlines = enriched
            .iter()
            .filter(|(draft, _)| draft.unreadable_deadline)
            .count();
        let records: Vec<Extracted> = enriched
            .into_iter()
            .enumerate()
            .map(|(i, (draft, enrichment))| Extracted {
                posting: draft.into_posting(source, i + 1),
                enrichment,
            })
            .collect();

        let harvest = Harvest {
            source,
            records,
            used_fallback: listing.used_fallback,
            unparsed_dates: listing.unparsed_posted + unreadable_deadlines,
            discarded: listing.discarded,
        };
        info!(
            count = harvest.len(),
            partial = harvest.partial_count(),
            discarded = harvest.discarded,
            "Extracted job postings"
        );
        Ok(harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeBrowser;
    use crate::normalize::is_iso_date;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn acbar_block(n: usize) -> String {
        format!(
            r#"<div class="block--main">
                 <h4 class="job-title"><a href="/jobs/{n}/role-{n}">Position Title: Role {n}</a></h4>
                 <ul class="list-group">
                   <li class="list-group-item"><span>Organization:</span> Org {n}</li>
                   <li class="list-group-item"><span>Job Location:</span> Kabul</li>
                   <li class="list-group-item"><span>Employment Type:</span> Full Time</li>
                   <li class="list-group-item"><span>Category:</span> Finance</li>
                   <li class="list-group-item"><span>Close date:</span> 30 October, 2025</li>
                 </ul>
               </div>"#
        )
    }

    fn acbar_listing(count: usize) -> String {
        let blocks: String = (1..=count).map(acbar_block).collect();
        format!("<html><body><div class='content-wrapper'>{blocks}</div></body></html>")
    }

    fn acbar_detail(n: usize) -> String {
        format!(
            r#"<html><body>
                 <ul>
                   <li class="list-group-item"><span>Employment Type:</span> Contract {n}</li>
                   <li class="list-group-item"><span>Category:</span> Programme</li>
                 </ul>
                 <div class="job-description"><p>Full description of role {n}.</p></div>
                 <div class="job-requirements"><ul><li>Degree</li><li>Dari</li><li>Degree</li></ul></div>
               </body></html>"#
        )
    }

    fn settings(strategy: StrategyKind, detail_limit: usize) -> SourceSettings {
        SourceSettings {
            enabled: true,
            strategy,
            detail_limit,
            listing_url: None,
        }
    }

    #[test]
    fn test_single_pass_acbar_listing() {
        let profile = SiteProfile::for_source(Source::Acbar).unwrap();
        let listing = parse_listing(&profile, &acbar_listing(2), today(), false);
        assert_eq!(listing.drafts.len(), 2);
        assert!(!listing.used_fallback);

        let first = &listing.drafts[0];
        assert_eq!(first.title, "Role 1");
        assert_eq!(first.organization, "Org 1");
        assert_eq!(first.location, "Kabul");
        assert_eq!(first.job_type, "Full Time");
        assert_eq!(first.category, "Finance");
        assert_eq!(first.deadline, "2025-10-30");
        assert_eq!(first.posted_date, "2026-10-19");
        assert_eq!(first.source_url, "https://www.acbar.org/jobs/1/role-1");
        assert_eq!(first.description, "Job opening for Role 1 at Org 1 in Kabul.");
        // Each block is its own scope even though they share a wrapper.
        assert_eq!(listing.drafts[1].organization, "Org 2");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let html = r#"<div class="block--main">
            <h4 class="job-title"><a href="https://www.acbar.org/jobs/9">Guard</a></h4>
            <div class="date_posted">Expire Date: 12 November, 2025</div>
          </div>"#;
        let profile = SiteProfile::for_source(Source::Acbar).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        let draft = &listing.drafts[0];
        assert_eq!(draft.organization, "Not specified");
        assert_eq!(draft.location, "Not specified");
        assert_eq!(draft.category, "Not specified");
        assert_eq!(draft.deadline, "2025-11-12");
    }

    #[test]
    fn test_records_without_title_or_link_are_dropped() {
        let html = r#"
          <div class="block--main"><h4 class="job-title"><a href="/jobs/1">   </a></h4></div>
          <div class="block--main"><h4 class="job-title">No link here</h4></div>
          <div class="block--main"><h4 class="job-title"><a href="/jobs/3">Cook</a></h4></div>
          <div class="block--main"><h4 class="job-title"><a href="/jobs/3">Cook again</a></h4></div>"#;
        let profile = SiteProfile::for_source(Source::Acbar).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        assert_eq!(listing.drafts.len(), 1);
        assert_eq!(listing.drafts[0].title, "Cook");
        assert_eq!(listing.discarded, 3);
    }

    #[test]
    fn test_title_without_link_ignores_page_links() {
        let html = r#"<html><body>
            <nav><a href="/about-us">About us</a></nav>
            <div class="job-list">
              <h4 class="job-title">Position Title: Driver</h4>
            </div>
            <aside>
              <li class="list-group-item"><span>Job Location:</span> Sidebar City</li>
            </aside>
          </body></html>"#;
        let profile = SiteProfile::for_source(Source::Acbar).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        assert!(listing.drafts.is_empty());
        assert_eq!(listing.discarded, 1);
    }

    #[test]
    fn test_uncontained_record_reads_only_its_parent() {
        let html = r#"<html><body>
            <div class="job-list">
              <h4 class="job-title"><a href="/jobs/7/driver">Driver</a></h4>
              <li class="list-group-item"><span>Organization:</span> NRC</li>
            </div>
            <aside>
              <li class="list-group-item"><span>Job Location:</span> Sidebar City</li>
            </aside>
          </body></html>"#;
        let profile = SiteProfile::for_source(Source::Acbar).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        assert_eq!(listing.drafts.len(), 1);

        let draft = &listing.drafts[0];
        assert_eq!(draft.source_url, "https://www.acbar.org/jobs/7/driver");
        assert_eq!(draft.organization, "NRC");
        assert_eq!(draft.location, "Not specified");
    }

    #[test]
    fn test_jobsaf_fallback_heuristic() {
        let html = r#"<html><body>
            <div class="flex position-row">
              <a href="/jobs/data-officer"><h3 class="text-lg">Data Officer</h3></a>
              <span class="company-name">World Food Programme</span>
              <p>Collect and clean data for field programmes.</p>
            </div>
          </body></html>"#;
        let profile = SiteProfile::for_source(Source::JobsAf).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        assert!(listing.used_fallback);
        assert_eq!(listing.drafts.len(), 1);

        let draft = &listing.drafts[0];
        assert_eq!(draft.title, "Data Officer");
        assert_eq!(draft.organization, "World Food Programme");
        assert_eq!(draft.location, "Afghanistan");
        assert_eq!(draft.job_type, "Full-time");
        assert_eq!(draft.category, "General");
        assert_eq!(draft.source_url, "https://www.jobs.af/jobs/data-officer");
        assert_eq!(draft.description, "Collect and clean data for field programmes.");
        assert_eq!(draft.deadline, "");
    }

    #[test]
    fn test_jobsaf_primary_selector() {
        let html = r#"<div class="job-card">
              <h2 class="job-title"><a href="https://www.jobs.af/jobs/nurse">Nurse</a></h2>
              <div class="location">Herat</div>
              <time datetime="2025-10-02">2 days ago</time>
              <span class="deadline">Deadline: Oct 20, 2025</span>
            </div>"#;
        let profile = SiteProfile::for_source(Source::JobsAf).unwrap();
        let listing = parse_listing(&profile, html, today(), false);
        assert!(!listing.used_fallback);
        let draft = &listing.drafts[0];
        assert_eq!(draft.title, "Nurse");
        assert_eq!(draft.location, "Herat");
        assert_eq!(draft.posted_date, "2025-10-02");
        assert_eq!(draft.deadline, "2025-10-20");
    }

    #[test]
    fn test_long_description_truncated() {
        let text = "x".repeat(500);
        let html = format!(
            r#"<div class="job-card"><h2 class="title"><a href="/j/1">A</a></h2><p>{text}</p></div>"#
        );
        let profile = SiteProfile::for_source(Source::JobsAf).unwrap();
        let listing = parse_listing(&profile, &html, today(), false);
        let description = &listing.drafts[0].description;
        assert!(description.ends_with("..."));
        assert_eq!(description.chars().count(), LISTING_DESCRIPTION_CHARS + 3);
    }

    #[test]
    fn test_posting_ids() {
        assert_eq!(
            posting_id(Source::Acbar, 3, "https://www.acbar.org/jobs/123/Field-Officer"),
            "acbar-3-field-officer"
        );
        assert_eq!(posting_id(Source::JobsAf, 1, "https://www.jobs.af/"), "jobsaf-1");
    }

    #[tokio::test]
    async fn test_two_pass_enriches_from_detail_pages() {
        let browser = FakeBrowser::new()
            .with_page(acbar::LISTING_URL, &acbar_listing(2))
            .with_page("https://www.acbar.org/jobs/1/role-1", &acbar_detail(1))
            .with_page("https://www.acbar.org/jobs/2/role-2", &acbar_detail(2));
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 10)).unwrap();

        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.len(), 2);
        assert_eq!(harvest.partial_count(), 0);

        let first = &harvest.records[0].posting;
        assert_eq!(first.id, "acbar-1-role-1");
        assert_eq!(first.job_type, "Contract 1");
        assert_eq!(first.category, "Programme");
        assert_eq!(first.description, "Full description of role 1.");
        assert_eq!(first.requirements, vec!["Degree".to_string(), "Dari".to_string()]);
        assert_eq!(first.source, "acbar.org");
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_failed_detail_page_keeps_record() {
        let mut browser = FakeBrowser::new().with_page(acbar::LISTING_URL, &acbar_listing(10));
        for n in 1..=10 {
            let url = format!("https://www.acbar.org/jobs/{n}/role-{n}");
            browser = if n == 3 {
                browser.with_failure(&url, "connection reset")
            } else {
                browser.with_page(&url, &acbar_detail(n))
            };
        }
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 10)).unwrap();

        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.len(), 10);
        assert_eq!(harvest.partial_count(), 1);

        let third = &harvest.records[2];
        assert!(matches!(third.enrichment, Enrichment::Partial { .. }));
        assert_eq!(third.posting.title, "Role 3");
        assert_eq!(third.posting.job_type, "");
        assert_eq!(third.posting.category, "");
        assert!(third.posting.requirements.is_empty());
        assert_eq!(harvest.records[3].posting.job_type, "Contract 4");
    }

    #[tokio::test]
    async fn test_unreadable_detail_deadline_is_counted() {
        let listing = r#"<div class="block--main">
              <h4 class="job-title"><a href="/jobs/5/guard">Guard</a></h4>
              <li class="list-group-item"><span>Organization:</span> IOM</li>
            </div>"#;
        let detail = r#"<html><body>
              <li class="list-group-item"><span>Close date:</span> until filled</li>
            </body></html>"#;
        let browser = FakeBrowser::new()
            .with_page(acbar::LISTING_URL, listing)
            .with_page("https://www.acbar.org/jobs/5/guard", detail);
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 10)).unwrap();

        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.len(), 1);
        assert_eq!(harvest.records[0].posting.deadline, "");
        assert_eq!(harvest.unparsed_dates, 1);
    }

    #[tokio::test]
    async fn test_detail_deadline_fills_unreadable_listing_deadline() {
        let listing = r#"<div class="block--main">
              <h4 class="job-title"><a href="/jobs/6/cook">Cook</a></h4>
              <li class="list-group-item"><span>Close date:</span> soon</li>
            </div>"#;
        let detail = r#"<html><body>
              <li class="list-group-item"><span>Close date:</span> 30 November, 2025</li>
            </body></html>"#;
        let browser = FakeBrowser::new()
            .with_page(acbar::LISTING_URL, listing)
            .with_page("https://www.acbar.org/jobs/6/cook", detail);
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 10)).unwrap();

        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.records[0].posting.deadline, "2025-11-30");
        assert_eq!(harvest.unparsed_dates, 0);
    }

    #[tokio::test]
    async fn test_detail_visits_are_capped_and_sequential() {
        let mut browser = FakeBrowser::new().with_page(acbar::LISTING_URL, &acbar_listing(4));
        for n in 1..=4 {
            let url = format!("https://www.acbar.org/jobs/{n}/role-{n}");
            browser = browser.with_page(&url, &acbar_detail(n));
        }
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 2)).unwrap();

        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.len(), 4);
        assert_eq!(harvest.records[2].enrichment, Enrichment::Skipped);
        assert_eq!(harvest.records[3].posting.job_type, "");
        assert_eq!(
            browser.visits(),
            vec![
                acbar::LISTING_URL.to_string(),
                "https://www.acbar.org/jobs/1/role-1".to_string(),
                "https://www.acbar.org/jobs/2/role-2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_fails_adapter_and_releases_page() {
        let browser = FakeBrowser::new().with_failure(acbar::LISTING_URL, "timed out");
        let adapter = SourceAdapter::new(Source::Acbar, settings(StrategyKind::TwoPass, 10)).unwrap();
        let result = adapter.extract(&browser, today()).await;
        assert!(matches!(result, Err(ScrapeError::Fetch { .. })));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_listing_url_override() {
        let mut config = settings(StrategyKind::SinglePass, 0);
        config.listing_url = Some("https://mirror.test/jobs".to_string());
        let browser = FakeBrowser::new().with_page("https://mirror.test/jobs", &acbar_listing(1));
        let adapter = SourceAdapter::new(Source::Acbar, config).unwrap();
        let harvest = adapter.extract(&browser, today()).await.unwrap();
        assert_eq!(harvest.len(), 1);
        for record in &harvest.records {
            assert!(is_iso_date(&record.posting.posted_date));
            assert!(record.posting.source_url.starts_with("https://"));
        }
    }
}

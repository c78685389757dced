//! Field normalization for scraped text.
//!
//! Scraped values arrive as loose text: dates in whatever format the site
//! prints, labels glued to values, stray whitespace from the markup. The
//! functions here turn them into the canonical values stored on a
//! [`JobPosting`](crate::models::JobPosting).
//!
//! Dates are calendar dates. No timezone handling happens anywhere in this
//! module.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

#[cfg(test)]
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static EMBEDDED_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]{3,})\.?,?\s+(\d{4})\b").unwrap());
static MONTH_DAY_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]{3,})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap());

/// Result of normalizing a date field.
///
/// `Missing` and `Unparsed` both carry the fallback date. Only `Unparsed`
/// means the site printed something we could not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    Parsed(NaiveDate),
    Missing(NaiveDate),
    Unparsed(NaiveDate),
}

impl DateOutcome {
    pub fn date(&self) -> NaiveDate {
        match *self {
            DateOutcome::Parsed(d) | DateOutcome::Missing(d) | DateOutcome::Unparsed(d) => d,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, DateOutcome::Unparsed(_))
    }

    /// The date as `YYYY-MM-DD`.
    pub fn to_iso(&self) -> String {
        self.date().format("%Y-%m-%d").to_string()
    }
}

/// Find a calendar date in `raw`.
///
/// Accepts ISO dates and long forms such as `5 September, 2025`,
/// `5 Sep 2025` or `September 5, 2025`, optionally surrounded by other text
/// (`Expire Date: 5 September, 2025`). Returns `None` when nothing in the
/// text is a real date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(c) = EMBEDDED_ISO.captures(raw) {
        if let Some(d) = ymd(&c[1], &c[2], &c[3]) {
            return Some(d);
        }
    }

    for c in DAY_MONTH_YEAR.captures_iter(raw) {
        if let Some(d) = from_parts(&c[1], &c[2], &c[3]) {
            return Some(d);
        }
    }

    for c in MONTH_DAY_YEAR.captures_iter(raw) {
        if let Some(d) = from_parts(&c[2], &c[1], &c[3]) {
            return Some(d);
        }
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    // %B also accepts the three-letter abbreviation when parsing.
    NaiveDate::parse_from_str(&format!("{day} {month} {year}"), "%d %B %Y").ok()
}

/// Normalize a posted date.
///
/// Empty or unreadable input falls back to `today`; the outcome says which
/// case applied so callers can report unreadable dates.
pub fn normalize_date(raw: &str, today: NaiveDate) -> DateOutcome {
    let raw = raw.trim();
    if raw.is_empty() {
        return DateOutcome::Missing(today);
    }
    match parse_date(raw) {
        Some(d) => DateOutcome::Parsed(d),
        None => DateOutcome::Unparsed(today),
    }
}

/// Normalize a deadline. Unknown deadlines stay empty instead of being
/// replaced by a made-up date.
pub fn normalize_deadline(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `true` for a valid `YYYY-MM-DD` string.
#[cfg(test)]
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a leading `label` (e.g. `Position Title:`) from `text`.
pub fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    text.trim()
        .strip_prefix(label)
        .map(str::trim_start)
        .unwrap_or_else(|| text.trim())
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate_description(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}

/// Resolve `href` against `base`, keeping only http(s) results.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

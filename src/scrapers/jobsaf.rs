//! jobs.af profile.
//!
//! [jobs.af](https://www.jobs.af) renders its listing with utility CSS and
//! changes class names often, so the primary card selectors are backed by a
//! loose fallback: any element whose class mentions `job-`, `position` or
//! `listing`. Fields are read with substring class matches for the same
//! reason.

use super::rules::{Field, Rule, selector};
use super::{DetailFields, ListingFields, ListingLayout, SiteProfile};
use crate::error::ScrapeError;
use crate::models::Source;
use url::Url;

pub const BASE_URL: &str = "https://www.jobs.af";

pub fn profile() -> Result<SiteProfile, ScrapeError> {
    let base_url = Url::parse(BASE_URL).map_err(|source| ScrapeError::BadUrl {
        url: BASE_URL.to_string(),
        source,
    })?;

    let layout = ListingLayout {
        primary: selector(".job-card, .job-item, article.job")?,
        fallback: Some(selector(
            r#"[class*="job-"], [class*="position"], [class*="listing"]"#,
        )?),
        container: None,
    };

    let listing = ListingFields {
        title: Field::new(vec![Rule::text(r#"[class*="title"], h2, h3"#)?]),
        link: Field::new(vec![Rule::attr("a[href]", "href")?]),
        organization: Field::new(vec![Rule::text(
            r#"[class*="company"], [class*="organization"]"#,
        )?])
        .or("Various"),
        location: Field::new(vec![Rule::text(r#"[class*="location"], [class*="city"]"#)?])
            .or("Afghanistan"),
        job_type: Field::new(vec![Rule::text(r#"[class*="type"], [class*="employment"]"#)?])
            .or("Full-time"),
        category: Field::new(vec![Rule::text(r#"[class*="category"], [class*="field"]"#)?])
            .or("General"),
        posted: Field::new(vec![
            Rule::attr("time[datetime]", "datetime")?,
            Rule::text(r#"[class*="posted"], [class*="publish"]"#)?,
        ]),
        deadline: Field::new(vec![Rule::text(
            r#"[class*="deadline"], [class*="closing"], [class*="expire"]"#,
        )?]),
        description: Field::new(vec![Rule::text(r#"p, [class*="description"]"#)?]),
    };

    let detail = DetailFields {
        job_type: Field::new(vec![Rule::text(r#"[class*="type"], [class*="employment"]"#)?])
            .or("Full-time"),
        category: Field::new(vec![Rule::text(r#"[class*="category"], [class*="field"]"#)?])
            .or("General"),
        description: Field::new(vec![
            Rule::text(r#"[class*="description"]"#)?,
            Rule::text("article, main")?,
        ]),
        deadline: Field::new(vec![Rule::text(
            r#"[class*="deadline"], [class*="closing"], [class*="expire"]"#,
        )?]),
        requirements: selector(r#"[class*="requirement"] li, [class*="qualification"] li"#)?,
    };

    Ok(SiteProfile {
        source: Source::JobsAf,
        base_url,
        listing_url: BASE_URL.to_string(),
        layout,
        listing,
        detail,
    })
}

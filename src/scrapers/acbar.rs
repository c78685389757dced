//! ACBAR job board profile.
//!
//! [ACBAR](https://www.acbar.org/jobs/) lists vacancies as blocks headed by a
//! `.job-title` element. The other fields sit in `Label: value` rows
//! (`.list-group-item` with the label in the first `span`), and the closing
//! date is repeated in the `.date_posted` footer as `Expire Date: …`.
//!
//! Detail pages reuse the same row layout and add the full description and
//! a requirements list.

use super::rules::{Field, Rule, selector};
use super::{DetailFields, ListingFields, ListingLayout, SiteProfile};
use crate::error::ScrapeError;
use crate::models::Source;
use url::Url;

pub const BASE_URL: &str = "https://www.acbar.org";
pub const LISTING_URL: &str = "https://www.acbar.org/jobs/";

const ROW: &str = ".list-group-item";
const UNSPECIFIED: &str = "Not specified";

pub fn profile() -> Result<SiteProfile, ScrapeError> {
    let base_url = Url::parse(BASE_URL).map_err(|source| ScrapeError::BadUrl {
        url: BASE_URL.to_string(),
        source,
    })?;

    let layout = ListingLayout {
        primary: selector(".job-title")?,
        fallback: Some(selector(r#"[class*="job-title"], [class*="jobtitle"]"#)?),
        container: Some(selector(".block--main, .content-wrapper")?),
    };

    let listing = ListingFields {
        title: Field::new(vec![Rule::AnchorText]).without_label("Position Title:"),
        link: Field::new(vec![Rule::anchor_attr("a[href]", "href")?]),
        organization: Field::new(vec![Rule::labeled(ROW, "Organization:")?]).or(UNSPECIFIED),
        location: Field::new(vec![Rule::labeled(ROW, "Job Location:")?]).or(UNSPECIFIED),
        job_type: Field::new(vec![Rule::labeled(ROW, "Employment Type:")?]).or(UNSPECIFIED),
        category: Field::new(vec![Rule::labeled(ROW, "Category:")?]).or(UNSPECIFIED),
        posted: Field::new(vec![
            Rule::labeled(ROW, "Posted date:")?,
            Rule::capture(".date_posted", r"Posted Date:\s*([^&|]+)")?,
        ]),
        deadline: Field::new(vec![
            Rule::labeled(ROW, "Close date:")?,
            Rule::capture(".date_posted", r"Expire Date:\s*([^&|]+)")?,
        ]),
        description: Field::new(vec![Rule::text(".job-summary, .job-description")?]),
    };

    let detail = DetailFields {
        job_type: Field::new(vec![Rule::labeled(ROW, "Employment Type:")?]).or(UNSPECIFIED),
        category: Field::new(vec![Rule::labeled(ROW, "Category:")?]).or(UNSPECIFIED),
        description: Field::new(vec![
            Rule::text(".job-description")?,
            Rule::text(".description, .job-content")?,
            Rule::text("article")?,
        ]),
        deadline: Field::new(vec![
            Rule::labeled(ROW, "Close date:")?,
            Rule::capture(".date_posted", r"Expire Date:\s*([^&|]+)")?,
        ]),
        requirements: selector(
            ".job-requirements li, .requirements li, .qualifications li",
        )?,
    };

    Ok(SiteProfile {
        source: Source::Acbar,
        base_url,
        listing_url: LISTING_URL.to_string(),
        layout,
        listing,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_builds() {
        let profile = profile().unwrap();
        assert_eq!(profile.source, Source::Acbar);
        assert_eq!(profile.base_url.as_str(), "https://www.acbar.org/");
        assert_eq!(profile.listing.organization.default_value(), "Not specified");
        assert_eq!(profile.detail.category.default_value(), "Not specified");
    }
}

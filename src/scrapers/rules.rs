//! Ordered extraction rules.
//!
//! Each field of a record is described by a [`Field`]: a list of [`Rule`]s
//! tried in order, the first non-empty result winning, and a default used
//! when none of them match. Site profiles are tables of these, which keeps
//! the "try this selector, else that one" logic inspectable and testable.

use crate::error::ScrapeError;
use crate::normalize::{clean_text, strip_label};
use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// The part of a document one record is read from.
///
/// `anchor` is the element that identified the record (a title, a card).
/// `container` is the enclosing element holding the rest of its fields; it
/// is the anchor itself when the anchor is the whole card.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub anchor: ElementRef<'a>,
    pub container: ElementRef<'a>,
}

impl<'a> Node<'a> {
    pub fn whole(element: ElementRef<'a>) -> Self {
        Self {
            anchor: element,
            container: element,
        }
    }
}

pub fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Whitespace-normalized text of an element and its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

#[derive(Debug)]
pub enum Rule {
    /// Text of the anchor itself.
    AnchorText,
    /// Text of the first descendant of the container matching the selector.
    Text(Selector),
    /// An attribute of the anchor (or its descendants), then of the container.
    Attr(Selector, &'static str),
    /// An attribute of the anchor or its descendants only.
    AnchorAttr(Selector, &'static str),
    /// The value of a `Label: value` row. Rows are matched by the selector
    /// and their first `span` holds the label.
    Labeled {
        row: Selector,
        label_span: Selector,
        label: &'static str,
    },
    /// First capture group of a pattern run over matching elements' text.
    Capture(Selector, Regex),
}

impl Rule {
    pub fn text(css: &str) -> Result<Self, ScrapeError> {
        Ok(Rule::Text(selector(css)?))
    }

    pub fn attr(css: &str, attr: &'static str) -> Result<Self, ScrapeError> {
        Ok(Rule::Attr(selector(css)?, attr))
    }

    pub fn anchor_attr(css: &str, attr: &'static str) -> Result<Self, ScrapeError> {
        Ok(Rule::AnchorAttr(selector(css)?, attr))
    }

    pub fn labeled(row: &str, label: &'static str) -> Result<Self, ScrapeError> {
        Ok(Rule::Labeled {
            row: selector(row)?,
            label_span: selector("span")?,
            label,
        })
    }

    pub fn capture(css: &str, pattern: &str) -> Result<Self, ScrapeError> {
        let regex = Regex::new(pattern).map_err(|source| ScrapeError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Rule::Capture(selector(css)?, regex))
    }

    /// Apply the rule, returning trimmed, non-empty text.
    pub fn apply(&self, node: &Node<'_>) -> Option<String> {
        let found = match self {
            Rule::AnchorText => Some(element_text(node.anchor)),
            Rule::Text(sel) => node
                .container
                .select(sel)
                .map(element_text)
                .find(|t| !t.is_empty()),
            Rule::Attr(sel, attr) => first_attr(
                anchor_attrs(node.anchor, sel, attr)
                    .chain(node.container.select(sel).filter_map(|e| e.value().attr(attr))),
            ),
            Rule::AnchorAttr(sel, attr) => first_attr(anchor_attrs(node.anchor, sel, attr)),
            Rule::Labeled {
                row,
                label_span,
                label,
            } => node.container.select(row).find_map(|item| {
                let span = item.select(label_span).next()?;
                if element_text(span) != *label {
                    return None;
                }
                let value = strip_label(&element_text(item), label).to_string();
                (!value.is_empty()).then_some(value)
            }),
            Rule::Capture(sel, regex) => node.container.select(sel).find_map(|e| {
                let text = element_text(e);
                let value = clean_text(regex.captures(&text)?.get(1)?.as_str());
                (!value.is_empty()).then_some(value)
            }),
        };
        found.filter(|t| !t.is_empty())
    }
}

/// `attr` of the anchor itself when it matches `sel`, then of its matching
/// descendants.
fn anchor_attrs<'a>(
    anchor: ElementRef<'a>,
    sel: &'a Selector,
    attr: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    let own = sel.matches(&anchor).then(|| anchor.value().attr(attr)).flatten();
    own.into_iter()
        .chain(anchor.select(sel).filter_map(move |e| e.value().attr(attr)))
}

fn first_attr<'a>(mut values: impl Iterator<Item = &'a str>) -> Option<String> {
    values.map(str::trim).find(|v| !v.is_empty()).map(str::to_string)
}

/// One output field: ordered rules plus a default.
#[derive(Debug)]
pub struct Field {
    rules: Vec<Rule>,
    default: &'static str,
    label: Option<&'static str>,
}

impl Field {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            default: "",
            label: None,
        }
    }

    /// Value used when no rule matches.
    pub fn or(mut self, default: &'static str) -> Self {
        self.default = default;
        self
    }

    /// Drop this leading label from matched values.
    pub fn without_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    #[cfg(test)]
    pub fn default_value(&self) -> &'static str {
        self.default
    }

    /// First non-empty rule result, if any.
    pub fn first_match(&self, node: &Node<'_>) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            let value = rule.apply(node)?;
            let value = match self.label {
                Some(label) => strip_label(&value, label).to_string(),
                None => value,
            };
            (!value.is_empty()).then_some(value)
        })
    }

    /// First non-empty rule result, or the default.
    pub fn resolve(&self, node: &Node<'_>) -> String {
        self.first_match(node)
            .unwrap_or_else(|| self.default.to_string())
    }
}

/// Text of every element matching `items` under `root`, trimmed, without
/// empties or repeats, in document order.
pub fn collect_items(root: ElementRef<'_>, items: &Selector) -> Vec<String> {
    root.select(items)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const CARD: &str = r#"
        <div class="block--main">
          <h3 class="job-title"><a href="/jobs/42/driver">Position Title: Driver</a></h3>
          <ul>
            <li class="list-group-item"><span>Organization:</span> UNICEF</li>
            <li class="list-group-item"><span>Job Location:</span>  Kabul </li>
            <li class="list-group-item"><span>Category:</span></li>
          </ul>
          <div class="date_posted">Posted Date: 1 October, 2025 &amp; Expire Date: 15 October, 2025</div>
        </div>"#;

    fn with_card<T>(f: impl FnOnce(Node<'_>) -> T) -> T {
        let doc = Html::parse_fragment(CARD);
        let container = doc.select(&selector(".block--main").unwrap()).next().unwrap();
        let anchor = doc.select(&selector(".job-title").unwrap()).next().unwrap();
        f(Node { anchor, container })
    }

    #[test]
    fn test_anchor_text_with_label_removed() {
        let title = Field::new(vec![Rule::AnchorText]).without_label("Position Title:");
        assert_eq!(with_card(|n| title.resolve(&n)), "Driver");
    }

    #[test]
    fn test_labeled_rows() {
        let org = Field::new(vec![Rule::labeled(".list-group-item", "Organization:").unwrap()])
            .or("Not specified");
        let loc = Field::new(vec![Rule::labeled(".list-group-item", "Job Location:").unwrap()]);
        assert_eq!(with_card(|n| org.resolve(&n)), "UNICEF");
        assert_eq!(with_card(|n| loc.resolve(&n)), "Kabul");
    }

    #[test]
    fn test_empty_labeled_row_takes_default() {
        let category = Field::new(vec![Rule::labeled(".list-group-item", "Category:").unwrap()])
            .or("Not specified");
        assert_eq!(with_card(|n| category.resolve(&n)), "Not specified");
    }

    #[test]
    fn test_capture_rule() {
        let deadline = Field::new(vec![
            Rule::labeled(".list-group-item", "Close date:").unwrap(),
            Rule::capture(".date_posted", r"Expire Date:\s*([^&|]+)").unwrap(),
        ]);
        assert_eq!(
            with_card(|n| deadline.first_match(&n)),
            Some("15 October, 2025".to_string())
        );
    }

    #[test]
    fn test_rules_tried_in_order() {
        let field = Field::new(vec![
            Rule::text(".missing").unwrap(),
            Rule::text("h3").unwrap(),
            Rule::text(".block--main").unwrap(),
        ]);
        assert_eq!(
            with_card(|n| field.first_match(&n)),
            Some("Position Title: Driver".to_string())
        );
    }

    #[test]
    fn test_attr_prefers_anchor() {
        let link = Field::new(vec![Rule::attr("a[href]", "href").unwrap()]);
        assert_eq!(with_card(|n| link.resolve(&n)), "/jobs/42/driver");
    }

    #[test]
    fn test_anchor_attr_ignores_container_links() {
        let doc = Html::parse_fragment(
            r#"<div class="block--main">
                 <a href="/about-us">About</a>
                 <h4 class="job-title">Position Title: Cook</h4>
               </div>"#,
        );
        let container = doc.select(&selector(".block--main").unwrap()).next().unwrap();
        let anchor = doc.select(&selector(".job-title").unwrap()).next().unwrap();
        let node = Node { anchor, container };

        let scoped = Field::new(vec![Rule::anchor_attr("a[href]", "href").unwrap()]);
        let loose = Field::new(vec![Rule::attr("a[href]", "href").unwrap()]);
        assert_eq!(scoped.first_match(&node), None);
        assert_eq!(loose.first_match(&node), Some("/about-us".to_string()));
        assert_eq!(with_card(|n| scoped.resolve(&n)), "/jobs/42/driver");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(matches!(
            Rule::text("div[[["),
            Err(ScrapeError::Selector { .. })
        ));
        assert!(matches!(
            Rule::capture("div", "(unclosed"),
            Err(ScrapeError::Pattern { .. })
        ));
    }

    #[test]
    fn test_collect_items_dedupes_in_order() {
        let doc = Html::parse_fragment(
            "<ul class='req'><li> Degree </li><li></li><li>English</li><li>Degree</li></ul>",
        );
        let root = doc.root_element();
        let items = collect_items(root, &selector(".req li").unwrap());
        assert_eq!(items, vec!["Degree".to_string(), "English".to_string()]);
    }
}

//! Line extraction: flatten the converter's markup body into styled lines.
//!
//! pdftohtml emits a flat `<body>`: text runs, `<b>`/`<i>` runs, `<br>`
//! between visual lines and an `<hr>` between pages. We walk the body's
//! children front to back with an explicit cursor and keep, for every line
//! that survives:
//!
//! * its style (bold, italic, another tag, or none for a bare text node),
//! * its whitespace-collapsed text,
//! * how many `<br>` preceded it (two or more mean "new idea"),
//! * the running page number.
//!
//! Page numbers come from bold footer/header lines: `"<n>      ..."` marks
//! the page being left and starts a footer block that runs to the next
//! `<hr>`; `"...      <n>"` names the page being entered. Both lines are
//! dropped, as are bold `Disclaimer:` lines.

use crate::error::HansardError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

static RE_BODY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body[\s>]").unwrap());
static RE_NBSP: Lazy<Regex> = Lazy::new(|| Regex::new(r"&nbsp;|&#160;").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Fragile by nature: ten or more whitespace characters separate the page
// number from the running header text.
static RE_PAGE_LEAVING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)\s{10,}").unwrap());
static RE_PAGE_ENTERING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{10,}([0-9]+)").unwrap());
static RE_DISCLAIMER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*Disclaimer:").unwrap());

/// Markup style of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    Bold,
    Italic,
    HorizontalRule,
    /// Any other tag, by lowercase name.
    Other(String),
}

impl Style {
    pub fn from_tag(name: &str) -> Self {
        match name {
            "b" | "strong" => Style::Bold,
            "i" | "em" => Style::Italic,
            "hr" => Style::HorizontalRule,
            other => Style::Other(other.to_ascii_lowercase()),
        }
    }
}

/// One extracted (or, after [`super::merge`], merged) line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// `None` for untagged text.
    pub style: Option<Style>,
    pub text: String,
    /// `<br>` count since the previous retained line.
    pub break_count: u32,
    pub page_number: u32,
}

impl Line {
    pub fn is_untagged(&self) -> bool {
        self.style.is_none()
    }

    pub fn is(&self, style: &Style) -> bool {
        self.style.as_ref() == Some(style)
    }
}

/// What a single body child means to the extractor.
enum Item {
    Break,
    Rule,
    Text { style: Option<Style>, text: String },
    Ignore,
}

/// Extract styled lines from converter markup.
///
/// # Errors
/// [`HansardError::NoBody`] when the markup has no `<body>` element.
pub fn extract_lines(markup: &str) -> Result<Vec<Line>, HansardError> {
    // pdftohtml pads runs with non-breaking spaces to keep its layout.
    let markup = RE_NBSP.replace_all(markup, " ");

    // html5ever synthesises a body for anything, so look for a real one.
    if !RE_BODY_TAG.is_match(&markup) {
        return Err(HansardError::NoBody);
    }
    let document = Html::parse_document(&markup);
    let body = document.select(&BODY).next().ok_or(HansardError::NoBody)?;
    let items: Vec<Item> = body
        .children()
        .map(|node| match node.value() {
            Node::Text(text) => Item::Text {
                style: None,
                text: (&**text).to_owned(),
            },
            Node::Element(el) if el.name() == "br" => Item::Break,
            Node::Element(el) => match Style::from_tag(el.name()) {
                Style::HorizontalRule => Item::Rule,
                style => Item::Text {
                    style: Some(style),
                    text: ElementRef::wrap(node)
                        .map(|e| e.text().collect::<String>())
                        .unwrap_or_default(),
                },
            },
            _ => Item::Ignore,
        })
        .collect();

    let mut lines = Vec::new();
    let mut break_count = 0u32;
    let mut page_number = 1u32;
    let mut cursor = 0usize;

    while cursor < items.len() {
        let item = &items[cursor];
        cursor += 1;

        let (style, text) = match item {
            Item::Break => {
                break_count += 1;
                continue;
            }
            Item::Rule | Item::Ignore => continue,
            Item::Text { style, text } => (style.clone(), text),
        };

        if text.trim().is_empty() {
            continue;
        }

        if style == Some(Style::Bold) {
            if let Some(leaving) = page_digits(&RE_PAGE_LEAVING, text) {
                page_number = advance_page(page_number, leaving.saturating_add(1));
                while cursor < items.len() {
                    let is_rule = matches!(items[cursor], Item::Rule);
                    cursor += 1;
                    if is_rule {
                        break;
                    }
                }
                continue;
            }

            if let Some(entering) = page_digits(&RE_PAGE_ENTERING, text) {
                page_number = advance_page(page_number, entering);
                continue;
            }

            if RE_DISCLAIMER.is_match(text) {
                continue;
            }
        }

        let text = collapse_whitespace(text);
        if text.is_empty() {
            continue;
        }

        lines.push(Line {
            style,
            text,
            break_count,
            page_number,
        });
        break_count = 0;
    }

    debug!(
        "Extracted {} lines over {} pages",
        lines.len(),
        page_number
    );
    Ok(lines)
}

fn page_digits(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Page numbers only move forward; a footer naming an earlier page is
/// taken as noise.
fn advance_page(current: u32, proposed: u32) -> u32 {
    if proposed < current {
        warn!(
            "Ignoring page number {} found on page {}",
            proposed, current
        );
        current
    } else {
        proposed
    }
}

fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

// src/page/html.rs
// =============================================================================
// This module reads things out of parsed HTML pages.
//
// - extract_links: every followable <a href> on a page, canonical and unique
// - page_meta: the <title> and <meta name="description"> of a page
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Never rejects input: broken markup is repaired the way browsers do it
//
// Rust concepts:
// - Borrowing: we read from &Html and &VisitedSet without taking ownership
// - HashSet::insert returning bool: handy for "first time seen?" checks
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::config::SchemePolicy;
use crate::page::normalize::{normalize_link, VisitedSet};

// Title and description of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// Text of <title>, trimmed; empty when the page has none
    pub title: String,
    /// content attribute of <meta name="description">, if present
    pub description: Option<String>,
}

// Extracts the followable links of a page in document order
//
// Parameters:
//   document: the parsed page
//   base_url: the URL of the page (for resolving relative links)
//   visited: URLs already fetched or queued in this crawl (not modified)
//   schemes: which schemes may be followed
//
// Returns: canonical URLs, first occurrence kept, nothing from `visited`
//
// Example:
//   anchors = [A, B, A, C], B already visited
//   result  = [A, C]
pub fn extract_links(
    document: &Html,
    base_url: &Url,
    visited: &VisitedSet,
    schemes: SchemePolicy,
) -> Vec<Url> {
    // "a[href]" means "all <a> tags that have an href attribute"
    let selector = Selector::parse("a[href]").expect("'a[href]' is a valid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(url) = normalize_link(base_url, href, schemes) else {
            continue;
        };

        if visited.contains(&url) {
            continue;
        }

        // insert() returns false for a URL we already collected
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    links
}

// Reads the title and description of a page
pub fn page_meta(document: &Html) -> PageMeta {
    let title_selector = Selector::parse("title").expect("'title' is a valid selector");
    let description_selector =
        Selector::parse(r#"meta[name="description"]"#).expect("meta selector is valid");

    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let description = document
        .select(&description_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.to_string());

    PageMeta { title, description }
}

// src/page/normalize.rs
// =============================================================================
// This module turns raw href values into canonical, fetchable URLs.
//
// Steps for every link:
// 1. Drop empty hrefs, in-page anchors (#...) and javascript: pseudo-links
// 2. Resolve the href against the page it was found on (RFC 3986 joining)
// 3. Drop anything whose scheme the SchemePolicy does not allow
// 4. Strip the query string and fragment
//
// Step 4 removes *every* query parameter, not only tracking ones like
// utm_source. Two pages that differ only by query collapse into one URL.
//
// The same canonical form is used for the visited set, so "seen before"
// means "same URL once the query is gone".
//
// Rust concepts:
// - Option<T>: normalize_link returns None for links we won't follow
// - Newtype wrapper: VisitedSet hides its HashSet behind a small API
// =============================================================================

use std::collections::HashSet;

use url::{ParseError, Url};

use crate::config::SchemePolicy;
use crate::error::FetchError;

// Resolves an href found on `base` into a canonical absolute URL
//
// Parameters:
//   base: the URL of the page the link was found on
//   href: the raw href attribute value
//   schemes: which schemes may be followed
//
// Returns: Some(url) for followable links, None otherwise
//
// Examples (base = "https://a.com/x"):
//   "/y?z=1"             -> Some("https://a.com/y")
//   "#top"               -> None
//   "javascript:void(0)" -> None
//   "mailto:me@a.com"    -> None (scheme not allowed)
pub fn normalize_link(base: &Url, href: &str, schemes: SchemePolicy) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let mut url = base.join(href).ok()?;

    if !schemes.allows(url.scheme()) {
        return None;
    }

    strip_query(&mut url);
    Some(url)
}

// Removes the query string (and the fragment that follows it)
pub fn strip_query(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}

// Parses user input (CLI argument, request body) into a URL we can fetch
//
// Input without a scheme gets "https://" in front of it, so
// "example.com/docs" is accepted as "https://example.com/docs".
// A "://" further along (e.g. in a redirect parameter) is not a scheme, and
// neither is "localhost:4000", which Url::parse reads as scheme "localhost".
// The query string is left alone here; the seed is fetched exactly as given.
pub fn parse_target(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::InvalidUrl(raw.to_string()));
    }

    let invalid = |_: ParseError| FetchError::InvalidUrl(raw.to_string());

    let url = match Url::parse(raw) {
        Ok(url) if has_explicit_scheme(raw, &url) => url,
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw)).map_err(invalid)?
        }
        Err(e) => return Err(invalid(e)),
    };

    if !SchemePolicy::HttpAndHttps.allows(url.scheme()) {
        return Err(FetchError::InvalidUrl(raw.to_string()));
    }

    Ok(url)
}

// True when `raw` starts with "<scheme>://" for the scheme Url::parse found
fn has_explicit_scheme(raw: &str, url: &Url) -> bool {
    raw.get(url.scheme().len()..)
        .is_some_and(|rest| rest.starts_with("://"))
}

// The set of URLs already fetched or queued during one crawl
//
// Membership is checked on the canonical (query-stripped) form. A set lives
// exactly as long as the crawl that created it.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited. Returns false if it was already there.
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(canonical(url))
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(&canonical(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn canonical(url: &Url) -> String {
    let mut url = url.clone();
    strip_query(&mut url);
    url.into()
}

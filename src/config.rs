// src/config.rs
// =============================================================================
// This module holds the settings for one crawl.
//
// Everything the fetcher and the traversal engine need to know (timeout,
// politeness delay, user agent, page budget, which URL schemes may be
// followed) lives in a single CrawlConfig value that the caller builds and
// passes in. Nothing here is global.
//
// Rust concepts:
// - Default trait: Gives every setting a sensible starting value
// - Builder methods: with_* methods that take self and return Self
// - Copy enums: Small enums that are passed around by value
// =============================================================================

use std::time::Duration;

// Default request timeout per fetch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Default pause before every outbound fetch
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

// Which URL schemes a resolved link may have to be followed
//
// Console crawls are often restricted to https links; the web service
// follows both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemePolicy {
    /// Follow http:// and https:// links
    #[default]
    HttpAndHttps,
    /// Follow https:// links only
    HttpsOnly,
}

impl SchemePolicy {
    /// Returns true if a URL with this scheme may be fetched
    pub fn allows(self, scheme: &str) -> bool {
        match self {
            SchemePolicy::HttpAndHttps => scheme == "http" || scheme == "https",
            SchemePolicy::HttpsOnly => scheme == "https",
        }
    }
}

// Switches for the HTML -> Markdown renderer
//
// Links are always kept as [text](url), text is never wrapped and
// non-ASCII characters come out as literal Unicode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Keep <img> elements as ![alt](src)
    pub images: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { images: true }
    }
}

// All settings for a single crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Fixed pause inserted before each fetch
    pub delay: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// How many related pages may be converted (the seed is not counted)
    pub max_pages: usize,
    /// Which schemes discovered links may use
    pub schemes: SchemePolicy,
    /// Markdown rendering switches
    pub markdown: MarkdownOptions,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            user_agent: default_user_agent(),
            max_pages: 0,
            schemes: SchemePolicy::default(),
            markdown: MarkdownOptions::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_schemes(mut self, schemes: SchemePolicy) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownOptions) -> Self {
        self.markdown = markdown;
        self
    }
}

// The descriptive User-Agent we identify ourselves with
pub fn default_user_agent() -> String {
    format!("page-harvest/{} (+markdown crawler)", env!("CARGO_PKG_VERSION"))
}

// src/crawl/result.rs
// =============================================================================
// The values a crawl hands back to its caller.
//
// - ConvertedPage: one page turned into Markdown
// - CrawlResult: the seed's Markdown and metadata plus the related pages,
//   in fetch order
// - CrawlSummary: counters for the console summary line
//
// All of them are plain owned data: once a crawl returns, the caller owns
// everything and nothing points back into the crawler.
// =============================================================================

use serde::Serialize;
use url::Url;

use crate::page::PageMeta;

// A page converted to Markdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedPage {
    #[serde(rename = "url")]
    pub source_url: Url,
    pub title: String,
    pub markdown: String,
}

// Output of crawling from an already-downloaded seed page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    pub seed_markdown: String,
    /// Title and description of the seed page
    pub seed_meta: PageMeta,
    pub related_pages: Vec<ConvertedPage>,
}

// Counters collected while crawling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Size of the visited set at the end (seed included)
    pub urls_processed: usize,
    /// Pages converted to Markdown (seed included)
    pub pages_converted: usize,
    /// Fetches that failed (timeout, connection, HTTP status)
    pub pages_failed: usize,
    /// Fetches that returned something other than HTML
    pub pages_skipped: usize,
}

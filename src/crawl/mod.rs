// src/crawl/mod.rs
// =============================================================================
// This module handles crawling: starting from a seed page, fetching the pages
// it links to and converting everything to Markdown.
//
// Features:
// - One-hop breadth-first crawling (links on related pages are not followed)
// - A page budget that only successful conversions count against
// - A fixed politeness pause before every request
// - Two entry points: from an already-fetched seed page (used by the web
//   service) and from a seed URL with streamed output (used by the console)
// =============================================================================

mod queue;
mod result;

pub use queue::Crawler;
pub use result::ConvertedPage;

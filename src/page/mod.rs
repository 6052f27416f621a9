// src/page/mod.rs
// =============================================================================
// This module contains everything that happens to a single page.
//
// Submodules:
// - normalize: Turns hrefs into canonical URLs, tracks visited URLs
// - html: Extracts links and metadata from parsed HTML
// - http: Downloads a page and classifies the response
// - markdown: Converts HTML into Markdown with a provenance header
//
// The crawl module strings these together; nothing here keeps state
// between calls.
// =============================================================================

mod html;
mod http;
mod markdown;
mod normalize;

pub use html::{extract_links, page_meta, PageMeta};
pub use http::{FetchResult, PageFetcher};
pub use markdown::to_markdown;
pub use normalize::{parse_target, VisitedSet};

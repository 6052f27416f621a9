// src/error.rs
// =============================================================================
// Typed errors for fetching and crawling.
//
// A failed fetch of a related page is only ever logged and skipped, so
// FetchError mostly travels inside FetchResult::Failed. The one place an
// error leaves a crawl is when the seed page itself cannot be used, which is
// what CrawlError describes.
//
// Rust concepts:
// - thiserror: Derives std::error::Error and Display from #[error(...)]
// - Enums with data: Each failure kind carries the details it needs
// =============================================================================

use thiserror::Error;

// Why a single fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// The input could not be turned into an absolute URL
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// No response arrived before the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// DNS, connection or TLS failure before any HTTP status was received
    #[error("Could not reach {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The status was fine but the body could not be read
    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

// Why a crawl could not produce a result at all
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to fetch seed page: {0}")]
    Seed(#[from] FetchError),

    #[error("Seed page {url} is not HTML (content-type: {content_type})")]
    SeedNotHtml { url: String, content_type: String },
}

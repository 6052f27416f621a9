// src/page/http.rs
// =============================================================================
// This module downloads pages.
//
// Key functionality:
// - One GET per URL with a fixed User-Agent, an HTML Accept header and a
//   per-request timeout
// - Sorts every outcome into FetchResult: Html, NonHtml or Failed
// - Never returns an error to the caller; failures are values
//
// Failure kinds (see FetchError):
// - Timeout: no response in time
// - Transport: DNS, connection refused, TLS problems
// - HttpStatus: the server answered, but not with 2xx
//
// Rust concepts:
// - async/await: Network I/O without blocking the runtime
// - Enums as results: FetchResult makes the caller handle every case
// =============================================================================

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::page::html::extract_links;
use crate::page::normalize::VisitedSet;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml";

// Outcome of fetching one URL
#[derive(Debug)]
pub enum FetchResult {
    /// An HTML page, with the links found on it (canonical, deduplicated)
    Html { body: String, links: Vec<Url> },
    /// The server sent something that isn't text/html; the body was dropped
    NonHtml { content_type: String },
    /// The request did not succeed
    Failed(FetchError),
}

// Fetches pages over HTTP
//
// The reqwest Client inside is reused for every request (connection
// pooling), so build one fetcher per crawl and pass it around by reference.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    config: CrawlConfig,
}

impl PageFetcher {
    // Builds the HTTP client from the crawl configuration
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Fetches one URL
    //
    // Parameters:
    //   url: the page to download
    //   visited: URLs to leave out of the returned link list
    //
    // Returns: Html with body and links, NonHtml, or Failed
    pub async fn fetch(&self, url: &Url, visited: &VisitedSet) -> FetchResult {
        match self.fetch_body(url).await {
            FetchResult::Html { body, .. } => {
                let document = Html::parse_document(&body);
                let links = extract_links(&document, url, visited, self.config.schemes);
                FetchResult::Html { body, links }
            }
            other => other,
        }
    }

    // Same as fetch, but the body is not parsed; `links` is always empty
    //
    // For callers that parse the page themselves anyway.
    pub async fn fetch_body(&self, url: &Url) -> FetchResult {
        info!("Fetching: {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return self.fail(categorize_error(url, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return self.fail(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            info!("Skipping non-HTML content: {} ({})", url, content_type);
            return FetchResult::NonHtml { content_type };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return self.fail(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(e) => {
                return self.fail(FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        info!(
            "Successfully fetched {} - Status: {}, Size: {} bytes",
            url,
            status.as_u16(),
            body.len()
        );

        FetchResult::Html {
            body,
            links: Vec::new(),
        }
    }

    fn fail(&self, error: FetchError) -> FetchResult {
        warn!("Error fetching: {}", error);
        FetchResult::Failed(error)
    }
}

// Only text/html counts as a page; parameters like "; charset=utf-8" are fine
fn is_html(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}

// Sorts reqwest errors into our failure kinds
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - Connection refused
// - SSL certificate issues
fn categorize_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return FetchResult instead of Result<String, FetchError>?
//    - There are three outcomes, not two: HTML, "fine but not HTML", failure
//    - A dedicated enum names each of them
//    - The crawler matches on it and must handle all three
//
// 2. What are default_headers?
//    - Headers attached to every request made with this Client
//    - We set Accept once here instead of on every .get()
//
// 3. Why `Err(e) if e.is_timeout()`?
//    - That's a match guard: the arm only matches when the condition holds
//    - Lets us split one error type into two FetchError variants
//
// 4. Why clone the config into the fetcher?
//    - The fetcher needs the scheme policy when extracting links
//    - Owning a copy means no lifetime ties back to the caller
// -----------------------------------------------------------------------------

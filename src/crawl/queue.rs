// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl itself: a breadth-first walk that stops
// one hop away from the seed page.
//
// How it works:
// 1. The seed URL goes into the visited set
// 2. The seed page is converted to Markdown and its links are extracted
// 3. Each link is queued as a related WorkItem, in document order
// 4. Related items are fetched one at a time, with a fixed pause before
//    every fetch, until `max_pages` of them were converted
// 5. Links found on related pages are thrown away (one hop only)
//
// Budget:
// - Only successfully converted pages count against max_pages
// - A failed or non-HTML fetch is still marked visited and never retried
//
// Politeness:
// - Requests never overlap; each one finishes before the next starts
// - The pause happens before every fetch, including the first one
//
// Rust concepts:
// - VecDeque: FIFO queue for breadth-first crawling
// - &mut borrows: the visited set is owned by the crawl and lent out
// - FnMut callbacks: the streaming variant hands each page to the caller
// =============================================================================

use std::collections::VecDeque;
use std::time::Duration;

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::crawl::result::{ConvertedPage, CrawlResult, CrawlSummary};
use crate::error::{CrawlError, FetchError};
use crate::page::{extract_links, page_meta, to_markdown, FetchResult, PageFetcher, VisitedSet};

// An entry in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: Url,
    /// Only the seed's links are followed
    pub is_seed: bool,
}

impl WorkItem {
    pub fn seed(url: Url) -> Self {
        Self { url, is_seed: true }
    }

    pub fn related(url: Url) -> Self {
        Self {
            url,
            is_seed: false,
        }
    }
}

// The fixed pause inserted before each outbound request
//
// With a delay d, a crawl that fetches n pages spends about n * d waiting,
// on top of the request latencies.
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    delay: Duration,
}

impl Politeness {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

// What happened when one WorkItem was visited
enum Visit {
    Page { page: ConvertedPage, links: Vec<Url> },
    NotHtml { content_type: String },
    Failed(FetchError),
}

// Drives the fetch -> extract -> convert chain for one crawl at a time
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: PageFetcher,
    politeness: Politeness,
}

impl Crawler {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: PageFetcher::new(config)?,
            politeness: Politeness::new(config.delay),
        })
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    fn config(&self) -> &CrawlConfig {
        self.fetcher.config()
    }

    // Crawls outward from a seed page the caller already downloaded
    //
    // Parameters:
    //   seed_html: the body of the seed page
    //   seed_url: where the seed page came from
    //   max_pages: how many related pages to convert at most
    //
    // Returns: the seed's Markdown and metadata, and up to max_pages related
    //          pages
    pub async fn crawl_page(
        &self,
        seed_html: &str,
        seed_url: &Url,
        max_pages: usize,
    ) -> CrawlResult {
        let mut visited = VisitedSet::new();
        visited.insert(seed_url);

        let seed_markdown = to_markdown(seed_html, seed_url, self.config().markdown);

        // The parsed document must be gone before the first .await
        let (seed_meta, links) = {
            let document = Html::parse_document(seed_html);
            let links = extract_links(&document, seed_url, &visited, self.config().schemes);
            (page_meta(&document), links)
        };
        info!("Seed page {} has {} followable link(s)", seed_url, links.len());

        let mut related_pages = Vec::new();
        let mut summary = CrawlSummary::default();
        let queue = links.into_iter().map(WorkItem::related).collect();

        self.fetch_related(queue, &mut visited, max_pages, &mut summary, |page| {
            related_pages.push(page)
        })
        .await;

        info!(
            "Crawl from {} done: {} related page(s), {} failed, {} skipped",
            seed_url, summary.pages_converted, summary.pages_failed, summary.pages_skipped
        );

        CrawlResult {
            seed_markdown,
            seed_meta,
            related_pages,
        }
    }

    // Fetches the seed itself and streams every converted page to `on_page`
    //
    // The seed is handed over first, followed by up to `max_additional`
    // related pages. A seed that can't be fetched, or isn't HTML, ends the
    // crawl with an error; related-page failures are logged and skipped.
    pub async fn crawl_streaming<F>(
        &self,
        seed_url: &Url,
        max_additional: usize,
        mut on_page: F,
    ) -> Result<CrawlSummary, CrawlError>
    where
        F: FnMut(ConvertedPage),
    {
        let mut visited = VisitedSet::new();
        let mut summary = CrawlSummary::default();

        let seed = WorkItem::seed(seed_url.clone());
        visited.insert(&seed.url);

        let links = match self.visit(&seed, &visited).await {
            Visit::Page { page, links } => {
                summary.pages_converted += 1;
                on_page(page);
                links
            }
            Visit::NotHtml { content_type } => {
                return Err(CrawlError::SeedNotHtml {
                    url: seed_url.to_string(),
                    content_type,
                })
            }
            Visit::Failed(e) => return Err(CrawlError::Seed(e)),
        };

        let queue = links.into_iter().map(WorkItem::related).collect();
        self.fetch_related(queue, &mut visited, max_additional, &mut summary, on_page)
            .await;

        summary.urls_processed = visited.len();
        Ok(summary)
    }

    // Works through the related-page queue until the budget is spent
    async fn fetch_related<F>(
        &self,
        mut queue: VecDeque<WorkItem>,
        visited: &mut VisitedSet,
        budget: usize,
        summary: &mut CrawlSummary,
        mut on_page: F,
    ) where
        F: FnMut(ConvertedPage),
    {
        let mut converted = 0;

        while let Some(item) = queue.pop_front() {
            if converted >= budget {
                debug!(
                    "Page budget of {} reached, {} link(s) left",
                    budget,
                    queue.len() + 1
                );
                break;
            }

            // insert() returns false when the URL was seen before
            if !visited.insert(&item.url) {
                continue;
            }

            match self.visit(&item, visited).await {
                Visit::Page { page, .. } => {
                    converted += 1;
                    summary.pages_converted += 1;
                    on_page(page);
                }
                Visit::NotHtml { content_type } => {
                    debug!(
                        "Not counting {} ({}) against the budget",
                        item.url, content_type
                    );
                    summary.pages_skipped += 1;
                }
                Visit::Failed(e) => {
                    warn!("Skipping related page {}: {}", item.url, e);
                    summary.pages_failed += 1;
                }
            }
        }
    }

    // Waits, fetches one item and converts it
    //
    // Links are only returned for the seed; a related page's own links are
    // dropped here so they can never be queued.
    async fn visit(&self, item: &WorkItem, visited: &VisitedSet) -> Visit {
        self.politeness.wait().await;

        match self.fetcher.fetch(&item.url, visited).await {
            FetchResult::Html { body, links } => {
                let page = self.convert(&body, &item.url);
                let links = if item.is_seed { links } else { Vec::new() };
                Visit::Page { page, links }
            }
            FetchResult::NonHtml { content_type } => Visit::NotHtml { content_type },
            FetchResult::Failed(e) => Visit::Failed(e),
        }
    }

    fn convert(&self, html: &str, url: &Url) -> ConvertedPage {
        let title = page_meta(&Html::parse_document(html)).title;
        let markdown = to_markdown(html, url, self.config().markdown);

        ConvertedPage {
            source_url: url.clone(),
            title,
            markdown,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the crawl sequential?
//    - Only one request is in flight at any time
//    - Combined with the pause, the target server sees at most one request
//      per delay period from us
//
// 2. What is FnMut?
//    - A closure that may change the variables it captured
//    - crawl_page passes |page| related_pages.push(page), which mutates a Vec
//    - crawl_streaming lets the caller print pages as soon as they arrive
//
// 3. Why does fetch_related take `visited: &mut VisitedSet`?
//    - The crawl owns the set; helpers only borrow it
//    - No hidden state lives in the Crawler between crawls
//
// 4. Why `queue.len() + 1` in the budget log line?
//    - pop_front() already removed the current item from the queue
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn crawler() -> Crawler {
        Crawler::new(
            &CrawlConfig::default()
                .with_delay(Duration::ZERO)
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    async fn mount_html(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.to_string(), "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;
    }

    fn seed_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_single_related_page() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", "<html><head><title>Page A</title></head><body><p>A body</p></body></html>").await;

        let seed_html = r##"<a href="/a">A</a><a href="#x">X</a><a href="/a">dup</a>"##;
        let result = crawler().crawl_page(seed_html, &seed_url(&server), 5).await;

        assert!(result.seed_markdown.starts_with(&format!("<!-- {} -->\n", seed_url(&server))));
        assert_eq!(result.seed_meta.title, "");
        assert_eq!(result.related_pages.len(), 1);

        let page = &result.related_pages[0];
        assert_eq!(page.source_url.as_str(), format!("{}/a", server.uri()));
        assert_eq!(page.title, "Page A");
        assert!(page.markdown.contains("A body"));
    }

    #[tokio::test]
    async fn test_seed_meta_comes_from_seed_html() {
        let server = MockServer::start().await;
        let seed_html = r#"<html><head><title> Home </title>
            <meta name="description" content="About us"></head>
            <body><p>Hi</p></body></html>"#;

        let result = crawler().crawl_page(seed_html, &seed_url(&server), 5).await;

        assert_eq!(result.seed_meta.title, "Home");
        assert_eq!(result.seed_meta.description.as_deref(), Some("About us"));
    }

    #[tokio::test]
    async fn test_non_html_related_page_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let seed_html = r#"<p>Seed text</p><a href="/a">A</a>"#;
        let result = crawler().crawl_page(seed_html, &seed_url(&server), 5).await;

        assert!(result.related_pages.is_empty());
        assert!(result.seed_markdown.contains("Seed text"));
    }

    #[tokio::test]
    async fn test_budget_caps_related_pages() {
        let server = MockServer::start().await;
        let mut seed_html = String::new();
        for i in 1..=6 {
            let route = format!("/p{}", i);
            mount_html(&server, &route, &format!("<p>page {}</p>", i)).await;
            seed_html.push_str(&format!(r#"<a href="{}">{}</a>"#, route, i));
        }

        let result = crawler().crawl_page(&seed_html, &seed_url(&server), 2).await;

        let urls: Vec<_> = result.related_pages.iter().map(|p| p.source_url.path().to_string()).collect();
        assert_eq!(urls, vec!["/p1", "/p2"]);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_fetches_nothing() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", "<p>A</p>").await;

        let result = crawler().crawl_page(r#"<a href="/a">A</a>"#, &seed_url(&server), 0).await;

        assert!(result.related_pages.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_consume_budget_and_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        mount_html(&server, "/ok1", "<p>one</p>").await;
        mount_html(&server, "/ok2", "<p>two</p>").await;

        // /broken appears twice (once with a query) but is fetched only once
        let seed_html = r#"
            <a href="/broken">B</a>
            <a href="/ok1">1</a>
            <a href="/broken?retry=1">B again</a>
            <a href="/ok2">2</a>
        "#;
        let result = crawler().crawl_page(seed_html, &seed_url(&server), 2).await;

        let urls: Vec<_> = result.related_pages.iter().map(|p| p.source_url.path().to_string()).collect();
        assert_eq!(urls, vec!["/ok1", "/ok2"]);
    }

    #[tokio::test]
    async fn test_related_page_links_are_not_followed() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", r#"<p>A</p><a href="/deeper">deeper</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/deeper"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = crawler().crawl_page(r#"<a href="/a">A</a>"#, &seed_url(&server), 10).await;
        assert_eq!(result.related_pages.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_link_back_to_itself_is_ignored() {
        let server = MockServer::start().await;
        let seed_html = r#"<a href="/">Home</a><a href="/?utm_source=x">Home again</a>"#;

        let result = crawler().crawl_page(seed_html, &seed_url(&server), 5).await;

        assert!(result.related_pages.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_streaming_emits_seed_then_related() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<title>Home</title><a href="/a">A</a><a href="/b">B</a>"#).await;
        mount_html(&server, "/a", "<title>A</title>").await;
        mount_html(&server, "/b", "<title>B</title>").await;

        let mut titles = Vec::new();
        let summary = crawler()
            .crawl_streaming(&seed_url(&server), 1, |page| titles.push(page.title))
            .await
            .unwrap();

        assert_eq!(titles, vec!["Home", "A"]);
        assert_eq!(summary.pages_converted, 2);
        assert_eq!(summary.urls_processed, 2);
    }

    #[tokio::test]
    async fn test_streaming_counts_failures() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/gone">gone</a><a href="/a">A</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_html(&server, "/a", "<p>A</p>").await;

        let summary = crawler()
            .crawl_streaming(&seed_url(&server), 5, |_| {})
            .await
            .unwrap();

        assert_eq!(
            summary,
            CrawlSummary {
                urls_processed: 3,
                pages_converted: 2,
                pages_failed: 1,
                pages_skipped: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_streaming_seed_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut pages = 0;
        let result = crawler()
            .crawl_streaming(&seed_url(&server), 5, |_| pages += 1)
            .await;

        assert!(matches!(
            result,
            Err(CrawlError::Seed(FetchError::HttpStatus { status: 503, .. }))
        ));
        assert_eq!(pages, 0);
    }

    #[tokio::test]
    async fn test_streaming_seed_not_html_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("{}", "application/json"),
            )
            .mount(&server)
            .await;

        let result = crawler().crawl_streaming(&seed_url(&server), 0, |_| {}).await;
        assert!(matches!(result, Err(CrawlError::SeedNotHtml { .. })));
    }

    #[tokio::test]
    async fn test_crawl_page_waits_before_each_related_fetch() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", "<p>A</p>").await;
        mount_html(&server, "/b", "<p>B</p>").await;

        let delay = Duration::from_millis(50);
        let crawler = Crawler::new(&CrawlConfig::default().with_delay(delay)).unwrap();
        let seed_html = r#"<a href="/a">A</a><a href="/b">B</a>"#;

        let started = Instant::now();
        let result = crawler.crawl_page(seed_html, &seed_url(&server), 2).await;

        // the seed is not fetched here, so only the 2 related fetches pause
        assert_eq!(result.related_pages.len(), 2);
        assert!(started.elapsed() >= delay * 2);
    }

    #[tokio::test]
    async fn test_delay_applies_before_every_fetch() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
        mount_html(&server, "/a", "<p>A</p>").await;
        mount_html(&server, "/b", "<p>B</p>").await;

        let delay = Duration::from_millis(50);
        let crawler = Crawler::new(&CrawlConfig::default().with_delay(delay)).unwrap();

        let started = Instant::now();
        let summary = crawler
            .crawl_streaming(&seed_url(&server), 2, |_| {})
            .await
            .unwrap();

        // seed + 2 related pages, each preceded by one pause
        assert_eq!(summary.pages_converted, 3);
        assert!(started.elapsed() >= delay * 3);
    }
}

// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Install the log subscriber (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build a CrawlConfig from the flags
// 4. Dispatch to the crawl (console) or serve (HTTP) handler
// 5. Exit with proper code (0 = success, 2 = error)
//
// Markdown goes to stdout and logs go to stderr, so
// `page-harvest crawl example.com > page.md` captures only the Markdown.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod page;
mod server;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::{CrawlConfig, MarkdownOptions, SchemePolicy};
use crawl::{ConvertedPage, Crawler};
use page::parse_target;
use server::AppState;

// Width of the banner lines printed around each page
const BANNER_WIDTH: usize = 80;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr; RUST_LOG overrides the default "info" level
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            url,
            max_links,
            timeout,
            delay_ms,
            https_only,
            no_images,
        } => {
            let config = CrawlConfig::default()
                .with_timeout(Duration::from_secs(timeout))
                .with_delay(Duration::from_millis(delay_ms))
                .with_max_pages(max_links)
                .with_schemes(scheme_policy(https_only))
                .with_markdown(MarkdownOptions { images: !no_images });

            handle_crawl(&url, config).await
        }
        Commands::Serve {
            host,
            port,
            max_related,
            timeout,
            delay_ms,
            https_only,
        } => {
            let config = CrawlConfig::default()
                .with_timeout(Duration::from_secs(timeout))
                .with_delay(Duration::from_millis(delay_ms))
                .with_max_pages(max_related)
                .with_schemes(scheme_policy(https_only));

            handle_serve(SocketAddr::new(host, port), config).await
        }
    }
}

fn scheme_policy(https_only: bool) -> SchemePolicy {
    if https_only {
        SchemePolicy::HttpsOnly
    } else {
        SchemePolicy::HttpAndHttps
    }
}

// Handles the 'crawl' subcommand
//
// Prints every converted page between banner lines as soon as it is ready,
// then a one-line summary. A seed page that can't be fetched stops the
// crawl with an error.
async fn handle_crawl(raw_url: &str, config: CrawlConfig) -> Result<i32> {
    println!("Starting crawler with seed URL: {}", raw_url);
    println!("Maximum additional links: {}", config.max_pages);

    let seed = parse_target(raw_url)?;
    let crawler = Crawler::new(&config)?;

    let summary = crawler
        .crawl_streaming(&seed, config.max_pages, |page| print_page(&page))
        .await?;

    info!(
        "{} page(s) converted, {} failed, {} skipped as non-HTML",
        summary.pages_converted, summary.pages_failed, summary.pages_skipped
    );
    println!("Crawling complete. Processed {} URLs.", summary.urls_processed);
    Ok(0)
}

fn print_page(page: &ConvertedPage) {
    let banner = "=".repeat(BANNER_WIDTH);

    println!("\n{}", banner);
    println!("MARKDOWN FOR URL: {}", page.source_url);
    println!("{}", banner);
    println!("{}", page.markdown);
    println!("{}\n", banner);
}

// Handles the 'serve' subcommand
async fn handle_serve(addr: SocketAddr, config: CrawlConfig) -> Result<i32> {
    let state = AppState {
        crawler: Crawler::new(&config)?,
        default_max_related: config.max_pages,
    };

    server::serve(addr, state).await?;
    Ok(0)
}

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: fetch a seed URL (plus some of the pages it links to) and print
//   each page as Markdown
// - serve: run the HTTP service that does the same thing per request
//
// The flags here are the only source of configuration; main turns them into
// a CrawlConfig.
// =============================================================================

use std::net::IpAddr;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "page-harvest",
    version,
    about = "Convert a web page and the pages it links to into Markdown",
    long_about = "page-harvest fetches a seed page, converts it to Markdown and then fetches \
                  and converts a bounded number of the pages it links to, one request at a \
                  time with a pause in between."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a page and the pages it links to as Markdown
    ///
    /// Example: page-harvest crawl https://example.com --max-links 3
    Crawl {
        /// The seed URL to start crawling from (https:// is assumed if missing)
        url: String,

        /// Maximum number of additional linked pages to convert
        #[arg(long, default_value_t = 0)]
        max_links: usize,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Pause before each request, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Only follow https:// links
        #[arg(long)]
        https_only: bool,

        /// Leave images out of the Markdown
        #[arg(long)]
        no_images: bool,
    },

    /// Run the HTTP service
    ///
    /// Example: page-harvest serve --port 4000
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, default_value_t = 4000)]
        port: u16,

        /// Related pages to convert when a request doesn't say
        #[arg(long, default_value_t = 5)]
        max_related: usize,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Pause before each related-page request, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Only follow https:// links
        #[arg(long)]
        https_only: bool,
    },
}

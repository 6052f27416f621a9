// src/page/markdown.rs
// =============================================================================
// This module converts HTML pages into Markdown.
//
// Pipeline:
// 1. Parse the HTML with `scraper`
// 2. Detach every <script>, <style>, <iframe> and <noscript> subtree
// 3. Serialize what is left and hand it to `htmd` for the Markdown rendering
// 4. Put a provenance comment "<!-- {url} -->" on the first line
//
// htmd keeps links as [text](url) and images as ![alt](src), never wraps
// lines and writes non-ASCII characters as they are.
//
// Rust concepts:
// - Mutable borrows: we edit the parsed tree in place (document.tree)
// - Two-phase edits: collect node ids first, then mutate, so we never
//   mutate the tree while iterating over it
// =============================================================================

use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::config::MarkdownOptions;

// Elements whose content must never reach the Markdown output
const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "iframe", "noscript"];

// Converts an HTML page into Markdown with a provenance header
//
// Parameters:
//   html: the raw page HTML
//   source_url: where the page came from (written into the header)
//   options: renderer switches
//
// Returns: "<!-- {source_url} -->\n" followed by the Markdown body
pub fn to_markdown(html: &str, source_url: &Url, options: MarkdownOptions) -> String {
    let cleaned = strip_non_content(html);
    let body = render(&cleaned, options);

    format!("<!-- {} -->\n{}", source_url, body)
}

// Removes non-content elements (and everything inside them) from the page
// and serializes the rest back to HTML
fn strip_non_content(html: &str) -> String {
    let mut document = Html::parse_document(html);
    let selector =
        Selector::parse(&NON_CONTENT_TAGS.join(", ")).expect("tag list is a valid selector");

    let doomed: Vec<_> = document.select(&selector).map(|element| element.id()).collect();

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.html()
}

fn render(html: &str, options: MarkdownOptions) -> String {
    // <head> holds the title and metadata, which are reported separately
    let mut skip = vec!["head"];
    skip.extend(NON_CONTENT_TAGS);
    if !options.images {
        skip.push("img");
    }

    let converter = HtmlToMarkdown::builder().skip_tags(skip).build();

    match converter.convert(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            // Fall back to the plain text of the page
            warn!("Markdown conversion failed, using plain text: {}", e);
            Html::parse_document(html)
                .root_element()
                .text()
                .collect::<String>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Event, Parser, Tag};

    fn source() -> Url {
        Url::parse("https://site.com/page").unwrap()
    }

    #[test]
    fn test_first_line_is_provenance_comment() {
        let markdown = to_markdown("<p>Hello</p>", &source(), MarkdownOptions::default());
        let first_line = markdown.lines().next().unwrap();
        assert_eq!(first_line, "<!-- https://site.com/page -->");
        assert!(markdown.starts_with("<!-- https://site.com/page -->\n"));
        assert!(markdown.contains("Hello"));
    }

    #[test]
    fn test_script_never_leaks() {
        let html = r#"
            <html><head><script>var secret = "tracker";</script></head>
            <body>
              <p>Visible</p>
              <script type="text/javascript">alert("boom")</script>
              <noscript><img src="/pixel.gif"> enable javascript</noscript>
              <style>body { color: red; }</style>
              <iframe src="https://ads.example.com/frame">frame text</iframe>
            </body></html>
        "#;
        let markdown = to_markdown(html, &source(), MarkdownOptions::default());

        assert!(markdown.contains("Visible"));
        for leaked in ["secret", "tracker", "alert", "boom", "script", "pixel.gif", "color: red", "frame"] {
            assert!(!markdown.contains(leaked), "found {:?} in {:?}", leaked, markdown);
        }
    }

    #[test]
    fn test_links_and_images_preserved() {
        let html = r#"<p>Read <a href="https://docs.rs/">the docs</a></p>
                      <p><img src="https://site.com/logo.png" alt="Logo"></p>"#;
        let markdown = to_markdown(html, &source(), MarkdownOptions::default());

        let mut link = None;
        let mut image = None;
        for event in Parser::new(&markdown) {
            match event {
                Event::Start(Tag::Link(_, dest, _)) => link = Some(dest.to_string()),
                Event::Start(Tag::Image(_, dest, _)) => image = Some(dest.to_string()),
                _ => {}
            }
        }

        assert_eq!(link.as_deref(), Some("https://docs.rs/"));
        assert_eq!(image.as_deref(), Some("https://site.com/logo.png"));
    }

    #[test]
    fn test_images_can_be_dropped() {
        let html = r#"<p>Text <img src="https://site.com/logo.png" alt="Logo"></p>"#;
        let markdown = to_markdown(html, &source(), MarkdownOptions { images: false });
        assert!(markdown.contains("Text"));
        assert!(!markdown.contains("logo.png"));
    }

    #[test]
    fn test_unicode_kept_literal_and_no_wrapping() {
        let long_sentence = "Café naïve ".repeat(30);
        let html = format!("<p>{}</p>", long_sentence.trim());
        let markdown = to_markdown(&html, &source(), MarkdownOptions::default());

        assert!(markdown.contains("Café naïve"));
        // header line + one paragraph line
        let body_lines: Vec<_> = markdown.lines().skip(1).filter(|l| !l.is_empty()).collect();
        assert_eq!(body_lines.len(), 1);
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let markdown = to_markdown("<div><p>Unclosed <b>bold", &source(), MarkdownOptions::default());
        assert!(markdown.contains("Unclosed"));
    }
}

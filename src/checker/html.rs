// src/checker/html.rs
// =============================================================================
// Structural link extraction: parse the page as HTML and take the href of
// every <a> element, instead of scanning the raw text.
//
// We use the `scraper` crate (built on html5ever) for the DOM and the `url`
// crate to resolve relative hrefs against the page URL.
//
// Unlike the quoted-URL scan this finds relative links, and it ignores
// URLs that only appear in scripts or attributes other than href.
// =============================================================================

use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

use super::extract::LinkExtractor;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAnchorExtractor;

impl LinkExtractor for HtmlAnchorExtractor {
    fn extract(&self, body: &str, page_url: &str) -> Vec<String> {
        extract_html_links(body, page_url)
    }
}

// Returns absolute http(s) URLs for every <a href> in document order.
//
// Example:
//   html = "<a href='/docs'>Docs</a>", base_url = "https://example.com"
//   result = ["https://example.com/docs"]
fn extract_html_links(html: &str, base_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            // Without a base we can't resolve relative links
            warn!(base_url, error = %e, "invalid page URL, skipping html extraction");
            return links;
        }
    };

    let document = Html::parse_document(html);
    for element in document.select(&ANCHOR_SELECTOR) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(&base, href) {
                if is_checkable_link(&absolute_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

// Absolute hrefs are kept exactly as written; anything else is joined onto
// the page.
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(_) => Some(href.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}

// Skips mailto:, tel:, javascript:, data: and friends
fn is_checkable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

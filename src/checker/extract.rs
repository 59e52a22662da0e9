// src/checker/extract.rs
// =============================================================================
// Link extraction strategies.
//
// The coordinator only needs "give me the links in this page", so extraction
// sits behind the LinkExtractor trait. Two strategies exist:
// - QuotedUrlExtractor: a text scan for any double-quoted https:// URL.
//   Crude but it also finds links inside inline scripts and JSON blobs.
// - HtmlAnchorExtractor (html.rs): a real HTML parse of <a href> elements.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

use super::html::HtmlAnchorExtractor;

/// Something that can pull candidate links out of a fetched page body.
///
/// Implementations must return links in document order and must not
/// deduplicate: every occurrence becomes its own probe.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str, page_url: &str) -> Vec<String>;
}

static QUOTED_HTTPS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(https://.+?)""#).expect("quoted URL pattern is valid"));

/// Heuristic scan: every `"https://..."` string in the raw text is a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedUrlExtractor;

impl LinkExtractor for QuotedUrlExtractor {
    fn extract(&self, body: &str, _page_url: &str) -> Vec<String> {
        QUOTED_HTTPS_URL
            .captures_iter(body)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

/// The extraction strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExtractorKind {
    /// Any double-quoted https:// URL in the page source
    #[default]
    Quoted,
    /// href attributes of <a> elements, relative links resolved
    Html,
}

impl ExtractorKind {
    pub fn build(self) -> Box<dyn LinkExtractor> {
        match self {
            ExtractorKind::Quoted => Box::new(QuotedUrlExtractor),
            ExtractorKind::Html => Box::new(HtmlAnchorExtractor),
        }
    }
}

// src/crawl/mod.rs
// =============================================================================
// Sitemap walking: fetch the sitemap, then each page it lists, and feed the
// links found on those pages to the checker.
//
// - fetch: plain page retrieval; failures here are fatal to the run
// - sitemap: <loc> extraction and the sequential page loop
// =============================================================================

mod fetch;
mod sitemap;

pub use sitemap::{CheckConfig, SitemapChecker};

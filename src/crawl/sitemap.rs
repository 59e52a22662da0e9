// src/crawl/sitemap.rs
// =============================================================================
// Walks a sitemap and checks every link on every page it lists.
//
// How it works:
// 1. Fetch the sitemap and pull out its https:// <loc> entries
// 2. For each page, strictly one after another:
//    fetch it, extract its links, hand each link to the probe coordinator
// 3. Meanwhile a printer task drains the coordinator's result stream and
//    reports each line as it arrives
// 4. Once the last page is done the coordinator is finished, the stream
//    runs dry, and the exit signal tells us whether anything was dead
//
// Page fetching is sequential on purpose: parallel page fetches didn't make
// runs faster. Probes from different pages still overlap freely.
// =============================================================================

use anyhow::{Context, Result};
use futures::StreamExt;
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::fetch::PageFetcher;
use crate::checker::{
    ExtractorKind, LinkClassifier, LinkExtractor, LinkTask, ProbeCoordinator, TolerancePolicy,
};
use crate::report::{error_chain, Reporter};

static SITEMAP_LOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<loc>(https://.+?)</loc>").expect("sitemap pattern is valid"));

/// Returns the https:// page URLs listed in a sitemap, in document order.
pub fn extract_sitemap_pages(sitemap: &str) -> Vec<String> {
    SITEMAP_LOC
        .captures_iter(sitemap)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Everything a run needs, resolved once before any probe starts.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub sitemap_url: String,
    pub policy: TolerancePolicy,
    pub extractor: ExtractorKind,
    /// Cap on in-flight probes; None means unbounded
    pub concurrency: Option<usize>,
    /// Skip pages that fail to fetch instead of aborting
    pub keep_going: bool,
}

impl CheckConfig {
    pub fn new(sitemap_url: impl Into<String>, policy: TolerancePolicy) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            policy,
            extractor: ExtractorKind::default(),
            concurrency: None,
            keep_going: false,
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Pages fetched and scanned
    pub pages: usize,
    /// Links probed (one result line each)
    pub links: usize,
    /// Links classified dead
    pub dead: usize,
    /// Final read of the exit signal, taken after every probe reported
    pub failure: bool,
}

impl RunSummary {
    pub fn failed(&self) -> bool {
        self.failure
    }
}

pub struct SitemapChecker {
    fetcher: PageFetcher,
    classifier: LinkClassifier,
    extractor: Box<dyn LinkExtractor>,
    concurrency: Option<usize>,
    keep_going: bool,
}

impl SitemapChecker {
    pub fn new(config: &CheckConfig) -> Result<Self> {
        let classifier = LinkClassifier::new(config.policy.clone())
            .context("failed to build link probe client")?;
        Self::with_classifier(config, classifier)
    }

    fn with_classifier(config: &CheckConfig, classifier: LinkClassifier) -> Result<Self> {
        let fetcher = PageFetcher::new().context("failed to build page fetch client")?;
        debug!(strict = config.policy.is_strict(), extractor = ?config.extractor, "checker ready");

        Ok(Self {
            fetcher,
            classifier,
            extractor: config.extractor.build(),
            concurrency: config.concurrency,
            keep_going: config.keep_going,
        })
    }

    #[cfg(test)]
    pub fn with_link_timeout(config: &CheckConfig, timeout: std::time::Duration) -> Result<Self> {
        let classifier = LinkClassifier::with_timeout(config.policy.clone(), timeout)?;
        Self::with_classifier(config, classifier)
    }

    #[cfg(test)]
    pub fn with_extractor(mut self, extractor: Box<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Checks every page listed in the sitemap at `sitemap_url`.
    ///
    /// A sitemap that can't be fetched is always an error.
    pub async fn run<W>(
        &self,
        sitemap_url: &str,
        reporter: Reporter<W>,
    ) -> Result<(RunSummary, Reporter<W>)>
    where
        W: Write + Send + 'static,
    {
        let pages = self.fetch_sitemap(sitemap_url).await?;
        self.check_pages(&pages, reporter).await
    }

    /// Fetches the sitemap and returns the pages it lists.
    pub async fn fetch_sitemap(&self, sitemap_url: &str) -> Result<Vec<String>> {
        let sitemap = self.fetcher.fetch(sitemap_url).await?;
        let pages = extract_sitemap_pages(&sitemap);
        info!(sitemap = sitemap_url, pages = pages.len(), "sitemap loaded");
        Ok(pages)
    }

    /// Checks the links on the given pages and reports each result.
    pub async fn check_pages<W>(
        &self,
        pages: &[String],
        reporter: Reporter<W>,
    ) -> Result<(RunSummary, Reporter<W>)>
    where
        W: Write + Send + 'static,
    {
        let (coordinator, mut results) = ProbeCoordinator::new(self.classifier.clone());
        let mut coordinator = match self.concurrency {
            Some(limit) => coordinator.with_concurrency_limit(limit),
            None => coordinator,
        };

        let printer = tokio::spawn(async move {
            let mut reporter = reporter;
            while let Some(result) = results.next().await {
                reporter.report(&result)?;
            }
            Ok::<_, std::io::Error>(reporter)
        });

        let mut summary = RunSummary::default();
        for page in pages {
            let body = match self.fetcher.fetch(page).await {
                Ok(body) => body,
                Err(e) if self.keep_going => {
                    warn!(page = %page, error = %error_chain(&e), "skipping page");
                    continue;
                }
                Err(e) => {
                    // Nothing may be printed after a fatal error.
                    printer.abort();
                    return Err(e.into());
                }
            };

            let links = self.extractor.extract(&body, page);
            info!(page = %page, links = links.len(), "probing links");
            for link in links {
                coordinator.submit(LinkTask::new(link, page.clone()));
            }
            summary.pages += 1;
        }

        summary.links = coordinator.scheduled();
        let signal = coordinator.finish();

        let reporter = printer
            .await
            .context("result printer stopped unexpectedly")?
            .context("failed to write results")?;

        // Every probe task has reported by now, so the signal is final.
        debug_assert_eq!(reporter.lines(), summary.links);
        summary.dead = signal.dead_links();
        summary.failure = signal.failure_occurred();
        info!(
            pages = summary.pages,
            links = summary.links,
            dead = summary.dead,
            "check finished"
        );
        Ok((summary, reporter))
    }
}

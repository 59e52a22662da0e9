// src/crawl/fetch.rs
// =============================================================================
// Fetches the sitemap and the pages it lists.
//
// This is the infrastructure side of the tool: if a page can't be retrieved
// there is nothing to check on it, so failures here are errors that abort
// the run (or, with --keep-going, skip the page). Link probes never come
// through here.
//
// No timeout is set on page fetches, so a stalled server stalls the whole
// run. Non-2xx status codes are not errors either; the body is still
// scanned for links, with a warning logged.
// =============================================================================

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to request {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a page and returns its body as text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "page answered with a non-success status");
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_non_success_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let body = fetcher.fetch(&server.uri()).await.unwrap();
        assert_eq!(body, "not here");
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = PageFetcher::new().unwrap();
        let url = format!("http://{addr}/sitemap.xml");
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
        assert_eq!(err.to_string(), format!("failed to request {url}"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

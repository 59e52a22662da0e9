// src/checker/http.rs
// =============================================================================
// This module probes a single link and decides whether it is alive.
//
// Key functionality:
// - Makes exactly one GET request per link, with a fixed timeout
// - Never retries: the first answer is the answer
// - Maps the status code through the tolerance policy to a Verdict
// - Turns transport failures (DNS, refused, TLS, timeout) into a Dead
//   verdict with an "unreachable" marker instead of an error
//
// A dead verdict trips the ExitSignal handed in by the coordinator.
// =============================================================================

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::policy::TolerancePolicy;
use super::signal::ExitSignal;

/// Time allowed from request start until the response headers arrive.
///
/// Generous on purpose: some documentation sites take over half a minute
/// to answer the first request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// One link to probe, plus the page it was found on (for display only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    pub url: String,
    pub origin: String,
}

impl LinkTask {
    pub fn new(url: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: origin.into(),
        }
    }
}

/// Outcome class of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// 200 OK
    Alive,
    /// A tolerated status in normal mode; counts as a pass
    ToleratedFailure,
    /// Anything else, including unreachable hosts
    Dead,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        !matches!(self, Verdict::Dead)
    }
}

/// What the probe actually observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeStatus {
    /// The server answered with this status code
    Code(u16),
    /// No response headers: connection error, TLS error or timeout
    Unreachable(UnreachableMarker),
}

// Serializes as the plain string "unreachable" in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableMarker {
    Unreachable,
}

impl ProbeStatus {
    pub const UNREACHABLE: ProbeStatus = ProbeStatus::Unreachable(UnreachableMarker::Unreachable);

    #[cfg(test)]
    pub fn code(self) -> Option<u16> {
        match self {
            ProbeStatus::Code(code) => Some(code),
            ProbeStatus::Unreachable(_) => None,
        }
    }
}

/// The result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL that was probed
    pub url: String,
    /// The page the URL was found on
    pub origin: String,
    pub status: ProbeStatus,
    pub verdict: Verdict,
    /// Why the probe failed, for unreachable links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkCheckResult {
    pub fn is_ok(&self) -> bool {
        self.verdict.is_pass()
    }
}

/// Probes links against a shared tolerance policy.
///
/// Cheap to share: the reqwest client is reference counted internally
/// and reuses connections across all probe tasks.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    client: Client,
    policy: TolerancePolicy,
}

impl LinkClassifier {
    /// Every probe gets PROBE_TIMEOUT; there is no way to change it at runtime.
    pub fn new(policy: TolerancePolicy) -> reqwest::Result<Self> {
        Self::build(policy, PROBE_TIMEOUT)
    }

    #[cfg(test)]
    pub fn with_timeout(policy: TolerancePolicy, timeout: Duration) -> reqwest::Result<Self> {
        Self::build(policy, timeout)
    }

    fn build(policy: TolerancePolicy, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, policy })
    }

    /// Probes one link and classifies the outcome.
    ///
    /// Dead verdicts are recorded on `signal`. Nothing here ever returns an
    /// error: every failure becomes part of the result.
    pub async fn classify(&self, task: LinkTask, signal: &ExitSignal) -> LinkCheckResult {
        // Only the headers are awaited; the body is dropped unread.
        let result = match self.client.get(&task.url).send().await {
            Ok(response) => self.analyze_response(task, response.status()),
            Err(e) => categorize_error(task, e),
        };

        if !result.verdict.is_pass() {
            signal.mark_failure();
        }
        result
    }

    fn analyze_response(&self, task: LinkTask, status: reqwest::StatusCode) -> LinkCheckResult {
        let verdict = self.policy.verdict_for(status);
        debug!(url = %task.url, status = status.as_u16(), ?verdict, "probe answered");

        LinkCheckResult {
            url: task.url,
            origin: task.origin,
            status: ProbeStatus::Code(status.as_u16()),
            verdict,
            message: None,
        }
    }
}

// Transport failures are always dead. The message only explains why, it
// does not change the verdict.
fn categorize_error(task: LinkTask, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string();

    let message = if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    debug!(url = %task.url, %message, "probe failed");

    LinkCheckResult {
        url: task.url,
        origin: task.origin,
        status: ProbeStatus::UNREACHABLE,
        verdict: Verdict::Dead,
        message: Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_answering(code: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/link"))
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;
        server
    }

    async fn probe(policy: TolerancePolicy, url: String) -> (LinkCheckResult, ExitSignal) {
        let classifier = LinkClassifier::new(policy).unwrap();
        let signal = ExitSignal::new();
        let result = classifier
            .classify(LinkTask::new(url, "https://example.com/"), &signal)
            .await;
        (result, signal)
    }

    #[tokio::test]
    async fn test_ok_link_is_alive() {
        let server = server_answering(200).await;
        let url = format!("{}/link", server.uri());
        let (result, signal) = probe(TolerancePolicy::normal(), url).await;

        assert_eq!(result.verdict, Verdict::Alive);
        assert_eq!(result.status, ProbeStatus::Code(200));
        assert_eq!(result.origin, "https://example.com/");
        assert!(!signal.failure_occurred());
    }

    #[tokio::test]
    async fn test_not_found_trips_signal() {
        let server = server_answering(404).await;
        let url = format!("{}/link", server.uri());
        let (result, signal) = probe(TolerancePolicy::normal(), url).await;

        assert_eq!(result.verdict, Verdict::Dead);
        assert_eq!(result.status.code(), Some(404));
        assert!(signal.failure_occurred());
    }

    #[tokio::test]
    async fn test_forbidden_tolerated_unless_strict() {
        let server = server_answering(403).await;
        let url = format!("{}/link", server.uri());

        let (normal, normal_signal) = probe(TolerancePolicy::normal(), url.clone()).await;
        assert_eq!(normal.verdict, Verdict::ToleratedFailure);
        assert!(normal.is_ok());
        assert!(!normal_signal.failure_occurred());

        let (strict, strict_signal) = probe(TolerancePolicy::strict(), url).await;
        assert_eq!(strict.verdict, Verdict::Dead);
        assert_eq!(strict.status.code(), Some(403));
        assert!(strict_signal.failure_occurred());
    }

    #[tokio::test]
    async fn test_slow_server_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let classifier =
            LinkClassifier::with_timeout(TolerancePolicy::normal(), Duration::from_millis(200))
                .unwrap();
        let signal = ExitSignal::new();
        let result = classifier
            .classify(LinkTask::new(server.uri(), "https://example.com/"), &signal)
            .await;

        assert_eq!(result.verdict, Verdict::Dead);
        assert_eq!(result.status, ProbeStatus::UNREACHABLE);
        assert_eq!(result.message.as_deref(), Some("Request timed out"));
        assert!(signal.failure_occurred());
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (result, signal) = probe(TolerancePolicy::normal(), format!("http://{addr}/")).await;
        assert_eq!(result.verdict, Verdict::Dead);
        assert_eq!(result.status, ProbeStatus::UNREACHABLE);
        assert!(result.message.is_some());
        assert!(signal.failure_occurred());
    }

    #[test]
    fn test_result_json_shape() {
        let result = LinkCheckResult {
            url: "https://a.example/".to_string(),
            origin: "https://example.com/".to_string(),
            status: ProbeStatus::UNREACHABLE,
            verdict: Verdict::Dead,
            message: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "unreachable");
        assert_eq!(json["verdict"], "dead");
        assert!(json.get("message").is_none());

        let tolerated = LinkCheckResult {
            status: ProbeStatus::Code(429),
            verdict: Verdict::ToleratedFailure,
            ..result
        };
        let json = serde_json::to_value(&tolerated).unwrap();
        assert_eq!(json["status"], 429);
        assert_eq!(json["verdict"], "tolerated_failure");
    }
}

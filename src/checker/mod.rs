// src/checker/mod.rs
// =============================================================================
// Everything needed to decide whether links are alive.
//
// Submodules:
// - policy: which status codes count as a pass (normal vs strict mode)
// - signal: the shared, monotone "did anything fail" flag
// - http: probes a single link and classifies the outcome
// - coordinator: fans out one task per link and streams the results
// - extract / html: strategies for pulling links out of a page
// =============================================================================

mod coordinator;
mod extract;
mod html;
mod http;
mod policy;
mod signal;

pub use coordinator::ProbeCoordinator;
pub use extract::{ExtractorKind, LinkExtractor};
pub use http::{LinkCheckResult, LinkClassifier, LinkTask, ProbeStatus, PROBE_TIMEOUT};
pub use policy::TolerancePolicy;

#[cfg(test)]
pub use http::Verdict;

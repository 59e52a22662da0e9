// src/checker/policy.rs
// =============================================================================
// The tolerance policy decides what an HTTP status code means for a link.
//
// Some sites answer automated requests with codes that look like failures
// but usually mean "we don't like bots" rather than "this page is gone".
// In normal mode those codes are tolerated. Strict mode switches the
// tolerance off, so anything other than 200 OK counts as dead.
//
// The policy is resolved once at startup and only ever read afterwards,
// so every probe task can share it through an Arc without locking.
// =============================================================================

use reqwest::StatusCode;

use super::http::Verdict;

/// Status codes treated as a soft pass in normal mode.
///
/// 202 Accepted is on the list because some search engines (DuckDuckGo)
/// answer link checkers with it.
pub const TOLERATED_STATUS_CODES: [StatusCode; 4] = [
    StatusCode::FORBIDDEN,         // very common, with or without a user agent
    StatusCode::BAD_REQUEST,       // e.g. gamefaqs.gamespot.com
    StatusCode::TOO_MANY_REQUESTS, // e.g. geizhals.de
    StatusCode::ACCEPTED,          // e.g. DuckDuckGo
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TolerancePolicy {
    tolerated: Vec<StatusCode>,
    strict: bool,
}

impl TolerancePolicy {
    /// Normal mode: the default tolerated set is active.
    pub fn normal() -> Self {
        Self {
            tolerated: TOLERATED_STATUS_CODES.to_vec(),
            strict: false,
        }
    }

    /// Strict mode: only 200 OK is alive.
    pub fn strict() -> Self {
        Self {
            tolerated: TOLERATED_STATUS_CODES.to_vec(),
            strict: true,
        }
    }

    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            Self::strict()
        } else {
            Self::normal()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// True when the code is in the tolerated set and strict mode is off.
    pub fn tolerates(&self, status: StatusCode) -> bool {
        !self.strict && self.tolerated.contains(&status)
    }

    // Order matters: a tolerated code wins before the OK check,
    // everything else is dead.
    pub fn verdict_for(&self, status: StatusCode) -> Verdict {
        if self.tolerates(status) {
            Verdict::ToleratedFailure
        } else if status == StatusCode::OK {
            Verdict::Alive
        } else {
            Verdict::Dead
        }
    }
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self::normal()
    }
}

//! Resilient fetch layer
//!
//! This module issues every network request the scraper makes:
//! - Identity rotation over a pool of browser user agents
//! - Adaptive pre-attempt delays driven by recent success rate
//! - Status-specific cooldowns and exponential transport backoff
//! - Detection of challenge pages and of pages without article content
//! - A bounded rolling history of attempt outcomes

mod content_check;
mod fetcher;
mod history;
mod identity;
mod policy;

pub use content_check::{ContentRules, BLOCKING_PATTERNS, MIN_VALIDITY_KEYWORDS, VALIDITY_KEYWORDS};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use history::{FetchHistory, FetchOutcome};
pub use identity::{IdentityPool, IdentityRotator, DEFAULT_USER_AGENTS};
pub use policy::{RetryPolicy, RetryState};

use std::fmt;
use thiserror::Error;

/// Failure of a single attempt, or of a whole fetch once retries run out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Timeout or connection-level fault
    #[error("network error: {message}")]
    NetworkTransient { message: String, timed_out: bool },

    /// Any status other than 200
    #[error("server rejected request with HTTP {status}")]
    ServerRejected { status: u16 },

    /// The body matched a known challenge/block marker
    #[error("blocking marker '{marker}' found in response")]
    ContentBlocked { marker: String },

    /// The body does not look like article content
    #[error("response has {found} domain keyword occurrences, {required} required")]
    ContentInvalid { found: usize, required: usize },

    /// Terminal: every allowed attempt failed
    #[error("gave up after {attempts} attempts, last error: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Classifies this error for the outcome history
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::NetworkTransient { timed_out: true, .. } => FetchStatus::Timeout,
            Self::NetworkTransient { .. } => FetchStatus::NetworkError,
            Self::ServerRejected { status: 403 } => FetchStatus::Blocked,
            Self::ServerRejected { status: 429 } => FetchStatus::RateLimited,
            Self::ServerRejected { status } if (500..600).contains(status) => {
                FetchStatus::ServerError
            }
            Self::ServerRejected { .. } => FetchStatus::Rejected,
            Self::ContentBlocked { .. } => FetchStatus::Blocked,
            Self::ContentInvalid { .. } => FetchStatus::InvalidContent,
            Self::ExhaustedRetries { last, .. } => last.status(),
        }
    }

    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        Self::NetworkTransient {
            message: error.to_string(),
            timed_out: error.is_timeout(),
        }
    }
}

/// Classification recorded for every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    Success,
    /// HTTP 403 or a challenge page
    Blocked,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// Any other non-200 status
    Rejected,
    Timeout,
    NetworkError,
    InvalidContent,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Blocked => "blocked",
            Self::RateLimited => "rate-limited",
            Self::ServerError => "server-error",
            Self::Rejected => "rejected",
            Self::Timeout => "timeout",
            Self::NetworkError => "network-error",
            Self::InvalidContent => "invalid-content",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Rate-limit state reported in platform response headers.
//!
//! The platform reports its window on every response:
//! - `x-rate-limit-limit`: requests allowed in the current window
//! - `x-rate-limit-remaining`: requests left in the window
//! - `x-rate-limit-reset`: epoch seconds when the window resets

use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const LIMIT_HEADER: &str = "x-rate-limit-limit";
const REMAINING_HEADER: &str = "x-rate-limit-remaining";
const RESET_HEADER: &str = "x-rate-limit-reset";

/// Parsed rate-limit headers of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitHeaders {
    /// Requests allowed in the window
    pub limit: Option<u32>,
    /// Requests remaining in the window
    pub remaining: Option<u32>,
    /// Window reset in epoch seconds
    pub reset: Option<i64>,
}

impl RateLimitHeaders {
    /// Parse the rate-limit headers out of a response header map.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_header(headers, LIMIT_HEADER),
            remaining: parse_header(headers, REMAINING_HEADER),
            reset: parse_header(headers, RESET_HEADER),
        }
    }

    /// True when the response reported no requests left in the window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Remembers the most recent rate-limit headers seen by an HTTP client.
///
/// # Example
///
/// ```rust,ignore
/// let tracker = RateLimitTracker::new();
/// let observed = tracker.observe(response.headers()).await;
/// if observed.is_exhausted() {
///     tracing::warn!(reset = ?observed.reset, "Rate limit window exhausted");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateLimitTracker {
    latest: Arc<RwLock<Option<RateLimitHeaders>>>,
}

impl RateLimitTracker {
    /// Create a tracker with nothing observed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the headers of a response. Responses without any rate-limit
    /// headers leave the last observation in place.
    #[instrument(skip(self, headers))]
    pub async fn observe(&self, headers: &HeaderMap) -> RateLimitHeaders {
        let parsed = RateLimitHeaders::from_headers(headers);
        if parsed != RateLimitHeaders::default() {
            debug!(
                limit = ?parsed.limit,
                remaining = ?parsed.remaining,
                reset = ?parsed.reset,
                "Observed rate limit headers"
            );
            *self.latest.write().await = Some(parsed);
        }
        parsed
    }

    /// The last observed headers, if any.
    pub async fn latest(&self) -> Option<RateLimitHeaders> {
        *self.latest.read().await
    }

    /// Forget the last observation.
    pub async fn clear(&self) {
        *self.latest.write().await = None;
    }
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, key: &str) -> Option<T> {
    headers.get(key)?.to_str().ok()?.trim().parse().ok()
}

//! Passive tracking of the GitHub API quota.

use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use reqwest::header::HeaderMap;

const LOG_TARGET: &str = "  github";

/// Remaining-request count below which a warning is logged.
pub const LOW_WATER_MARK: u64 = 100;

/// Quota state reported by the most recent response that carried rate limit headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

/// The quota is used up and will not reset until `reset_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitExceeded {
    pub reset_at: DateTime<Utc>,
}

impl Display for RateLimitExceeded {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "GitHub API rate limit exhausted, resets at {}", self.reset_at.to_rfc3339())
    }
}

impl core::error::Error for RateLimitExceeded {}

/// Records the quota reported by GitHub and refuses to issue requests once it's spent.
///
/// The snapshot only lives as long as the tracker; nothing is known about the quota
/// until the first response carrying the headers arrives.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    snapshot: Option<RateLimitSnapshot>,
}

impl RateLimitTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    /// Replace the current snapshot with the quota described by `headers`, if complete.
    pub fn observe(&mut self, headers: &HeaderMap) {
        let Some(snapshot) = extract_rate_limit_from_headers(headers) else {
            return;
        };

        if snapshot.remaining < LOW_WATER_MARK {
            log::warn!(
                target: LOG_TARGET,
                "GitHub API rate limit is running low: {}/{} requests remaining, resets at {}",
                snapshot.remaining,
                snapshot.limit,
                snapshot.reset_at.to_rfc3339(),
            );
        }

        self.snapshot = Some(snapshot);
    }

    #[must_use]
    pub const fn current(&self) -> Option<RateLimitSnapshot> {
        self.snapshot
    }

    /// Fail if the last known quota is spent and has not reset yet as of `now`.
    pub fn ensure_available(&self, now: DateTime<Utc>) -> Result<(), RateLimitExceeded> {
        match self.snapshot {
            Some(s) if s.remaining == 0 && s.reset_at > now => Err(RateLimitExceeded { reset_at: s.reset_at }),
            _ => Ok(()),
        }
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    let limit = headers.get("x-ratelimit-limit")?.to_str().ok()?.trim().parse::<u64>().ok()?;

    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.trim().parse::<u64>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.trim().parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    (remaining <= limit).then_some(RateLimitSnapshot { limit, remaining, reset_at })
}

//! Typed failures of [`resilient_fetch`](super::resilient_fetch).

use core::fmt::{Display, Formatter};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// How a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// An attempt did not complete within the per-attempt timeout.
    Timeout,

    /// The request never produced a response (DNS, connection refused, reset, ...).
    Network,

    /// The server answered with a status outside the 2xx/3xx range.
    Status,

    /// The request could not be replayed for another attempt.
    Request,
}

/// Error produced by [`resilient_fetch`](super::resilient_fetch).
#[derive(Debug)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl FetchError {
    pub(super) fn timeout(timeout: Duration) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            message: format!("timeout after {}ms", timeout.as_millis()),
            status: None,
            headers: HeaderMap::new(),
        }
    }

    pub(super) fn network(error: &reqwest::Error) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            message: format!("network error: {error}"),
            status: None,
            headers: HeaderMap::new(),
        }
    }

    pub(super) fn status(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            kind: FetchErrorKind::Status,
            message: format!(
                "unexpected status code: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("<unknown status>")
            ),
            status: Some(status),
            headers,
        }
    }

    pub(super) fn unreplayable() -> Self {
        Self {
            kind: FetchErrorKind::Request,
            message: "request body cannot be replayed".to_string(),
            status: None,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status of the failing response, if the server answered.
    #[must_use]
    pub const fn http_status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The canonical reason phrase of the failing response, if known.
    #[must_use]
    pub fn status_text(&self) -> Option<&'static str> {
        self.status.and_then(|s| s.canonical_reason())
    }

    /// Headers of the failing response; empty when there was no response.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether another attempt may succeed.
    ///
    /// Timeouts, network failures, 429 and 5xx responses are transient. Everything
    /// else is a client-side problem that retrying will not fix.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self.kind {
            FetchErrorKind::Timeout | FetchErrorKind::Network => true,
            FetchErrorKind::Status => self.status.is_some_and(is_retryable_status),
            FetchErrorKind::Request => false,
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for FetchError {}

/// 429 and every 5xx status are worth another attempt.
pub(super) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

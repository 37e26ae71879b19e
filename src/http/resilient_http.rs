//! Resilient HTTP request utilities using retry and timeout middleware.
//!
//! Wraps a single HTTP exchange with [`seatbelt`] retry and timeout middleware so
//! that transient network failures are masked automatically while client errors
//! surface right away. Each attempt covers the whole exchange, body included.

use super::fetch_error::{FetchError, is_retryable_status};
use bytes::Bytes;
use core::time::Duration;
use layered::{Execute, Service, Stack};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tick::Clock;

const LOG_TARGET: &str = "    http";

/// Default timeout for a single attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum retry attempts (on top of the first attempt).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff between retries.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default ceiling for the backoff delay.
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Timeout and retry parameters for one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Bound on each individual attempt, not on the whole sequence.
    pub timeout: Duration,

    /// Retryable failures tolerated before giving up.
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further one.
    pub base_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl FetchPolicy {
    /// A default policy with a specific per-attempt timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, ..Self::default() }
    }
}

/// A fully received 2xx/3xx response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchResponse {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Whether the outcome of one attempt is worth another attempt.
fn is_retryable(result: &Result<FetchResponse, FetchError>) -> bool {
    match result {
        // Timeouts and network errors are transient, anything else is final.
        Err(e) => e.is_transient(),

        // 429 and 5xx
        Ok(resp) => is_retryable_status(resp.status),
    }
}

/// Classify the outcome of one attempt for retry purposes.
fn should_retry(result: &Result<FetchResponse, FetchError>) -> RecoveryInfo {
    if is_retryable(result) {
        RecoveryInfo::retry()
    } else {
        RecoveryInfo::never()
    }
}

/// Send an HTTP request with automatic retry and timeout.
///
/// Retries on network errors, timeouts, 429 and 5xx responses with exponential
/// backoff, `min(base_delay * 2^(retry - 1), max_delay)` without jitter. Any other
/// status outside 2xx/3xx fails immediately. After `policy.max_retries` retryable
/// failures the last error is returned.
///
/// Each attempt is bounded by `policy.timeout`, from sending the request until the
/// last byte of the body has arrived.
pub async fn resilient_fetch(client: &reqwest::Client, request: reqwest::Request, policy: &FetchPolicy) -> Result<FetchResponse, FetchError> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("http_fetch");

    let method = request.method().clone();
    let path = request.url().path().to_string();
    let attempt_timeout = policy.timeout;

    let client = client.clone();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &Result<FetchResponse, FetchError>, _| should_retry(result))
            .max_retry_attempts(policy.max_retries)
            .base_delay(policy.base_delay)
            .max_delay(policy.max_delay)
            .backoff(Backoff::Exponential)
            .use_jitter(false)
            .on_retry(move |_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "retrying {method} {path} (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |_| FetchError::timeout(attempt_timeout))
            .timeout(attempt_timeout),
        Execute::new(move |request: Arc<reqwest::Request>| {
            let client = client.clone();
            async move { execute_once(&client, &request).await }
        }),
    )
        .into_service();

    let response = service.execute(Arc::new(request)).await?;

    // A retryable status that outlived every retry is still a failure.
    if response.status.is_success() || response.status.is_redirection() {
        Ok(response)
    } else {
        Err(FetchError::status(response.status, response.headers))
    }
}

async fn execute_once(client: &reqwest::Client, request: &reqwest::Request) -> Result<FetchResponse, FetchError> {
    let request = request.try_clone().ok_or_else(FetchError::unreplayable)?;

    let response = client.execute(request).await.map_err(|e| FetchError::network(&e))?;

    let status = response.status();
    let headers = response.headers().clone();

    if is_retryable_status(status) {
        log::debug!(target: LOG_TARGET, "transient status {status} from {}", response.url().path());
        return Ok(FetchResponse {
            status,
            headers,
            body: Bytes::new(),
        });
    }

    if !status.is_success() && !status.is_redirection() {
        return Err(FetchError::status(status, headers));
    }

    let body = response.bytes().await.map_err(|e| FetchError::network(&e))?;

    Ok(FetchResponse { status, headers, body })
}

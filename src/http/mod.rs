//! Shared HTTP plumbing for the GitHub, Gemini and Discord clients.

mod fetch_error;
mod resilient_http;

pub use fetch_error::{FetchError, FetchErrorKind};
pub use resilient_http::{
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_DELAY, FetchPolicy, FetchResponse,
    resilient_fetch,
};

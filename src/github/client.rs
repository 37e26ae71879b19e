//! GitHub API client
//!
//! Minimal client for fetching a user's activity feed.

use super::events::{FormattedActivityEvent, RawActivityEvent, classify};
use super::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use crate::Result;
use crate::http::{FetchPolicy, resilient_fetch};
use chrono::{DateTime, TimeDelta, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

const LOG_TARGET: &str = "  github";

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// REST API version requested on every call
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Default page size for the events feed (GitHub's maximum)
pub const DEFAULT_EVENTS_PER_PAGE: u8 = 100;

/// Default per-attempt timeout for GitHub requests
pub const DEFAULT_GITHUB_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Connection settings for [`Client`]
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub username: String,
    pub token: String,
    pub base_url: String,
    pub per_page: u8,
    pub fetch_policy: FetchPolicy,
}

impl GitHubSettings {
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            per_page: DEFAULT_EVENTS_PER_PAGE,
            fetch_policy: FetchPolicy::with_timeout(DEFAULT_GITHUB_TIMEOUT),
        }
    }
}

/// GitHub API client scoped to a single user's activity feed
#[derive(Debug)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    username: String,
    base_url: String,
    per_page: u8,
    fetch_policy: FetchPolicy,
    rate_limit: RateLimitTracker,
    now: DateTime<Utc>,
}

impl Client {
    /// Create a new client; `now` anchors the 24-hour activity window.
    pub fn new(settings: GitHubSettings, now: DateTime<Utc>) -> Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("Bearer {}", settings.token))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        let _ = headers.insert("x-github-api-version", HeaderValue::from_static(GITHUB_API_VERSION));

        let client = reqwest::Client::builder()
            .user_agent(concat!("daily-reporter/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            username: settings.username,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            per_page: settings.per_page,
            fetch_policy: settings.fetch_policy,
            rate_limit: RateLimitTracker::new(),
            now,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Quota reported by the most recent GitHub response, if any.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<RateLimitSnapshot> {
        self.rate_limit.current()
    }

    /// Fetch the user's events from the 24 hours preceding `now`, ready for summarization.
    pub async fn get_daily_events(&mut self) -> Result<Vec<FormattedActivityEvent>> {
        let events = self.fetch_user_events().await?;
        let total = events.len();

        let recent = filter_recent(events, self.now - TimeDelta::hours(24));
        log::info!(target: LOG_TARGET, "{} of {total} events for '{}' are from the last 24 hours", recent.len(), self.username);

        Ok(classify(&recent))
    }

    /// Retrieve one page of the user's events feed.
    pub async fn fetch_user_events(&mut self) -> Result<Vec<RawActivityEvent>> {
        let username = self.username.clone();

        self.rate_limit
            .ensure_available(Utc::now())
            .into_app_err_with(|| format!("could not fetch events for GitHub user '{username}'"))?;

        let url = format!("{}/users/{username}/events", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("per_page", self.per_page)])
            .build()
            .into_app_err_with(|| format!("could not build request for '{url}'"))?;

        log::info!(target: LOG_TARGET, "Querying GitHub for events of '{username}'");

        let response = match resilient_fetch(&self.client, request, &self.fetch_policy).await {
            Ok(response) => response,
            Err(e) => {
                self.rate_limit.observe(e.headers());
                return Err(e).into_app_err_with(|| format!("could not fetch events for GitHub user '{username}'"));
            }
        };

        self.rate_limit.observe(response.headers());

        response
            .json::<Vec<RawActivityEvent>>()
            .into_app_err_with(|| format!("could not decode events for GitHub user '{username}'"))
    }
}

/// Keep only the events that happened strictly after `since`, preserving order.
#[must_use]
pub fn filter_recent(events: Vec<RawActivityEvent>, since: DateTime<Utc>) -> Vec<RawActivityEvent> {
    events.into_iter().filter(|e| e.created_at > since).collect()
}

//! GitHub activity collection
//!
//! Fetches a user's events feed, keeps the last 24 hours of activity, and projects each
//! event into a uniform record suitable for summarization. The client also tracks the
//! API quota reported in response headers and refuses to issue requests once it is spent.

mod client;
mod events;
mod rate_limit;

pub use client::{
    Client, DEFAULT_EVENTS_PER_PAGE, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_TIMEOUT, GITHUB_API_VERSION, GitHubSettings, filter_recent,
};
pub use events::{Commit, EventKind, FormattedActivityEvent, Payload, PullRequestRef, RawActivityEvent, RepoRef, classify, extract_branch};
pub use rate_limit::{LOW_WATER_MARK, RateLimitExceeded, RateLimitSnapshot, RateLimitTracker};

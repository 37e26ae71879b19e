//! daily-reporter crate
//!
//! Collects a GitHub user's activity from the last 24 hours, asks Gemini for a short
//! narrative summary, and posts it to a Discord webhook. Failures anywhere in the
//! pipeline are posted to the same webhook as an error notification.
//!
//! This crate is an implementation detail of the `daily-reporter` tool. Its API is fluid
//! and may change without warning and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod discord;

#[doc(hidden)]
pub mod gemini;

#[doc(hidden)]
pub mod github;

#[doc(hidden)]
pub mod http;

#[doc(hidden)]
pub mod report;

#[doc(hidden)]
pub mod truncate;

pub use crate::commands::{Host, run};

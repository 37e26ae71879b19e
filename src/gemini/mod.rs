//! AI summary of the day's activity, backed by Gemini.

mod client;
mod prompt;

pub use client::{
    Client, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_TIMEOUT, GeminiSettings, MAX_EVENTS_JSON_BYTES, MAX_SUMMARY_CHARS,
    SummaryInputError, validate_events_json,
};
pub use prompt::build_prompt;

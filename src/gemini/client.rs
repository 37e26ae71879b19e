//! Gemini API client
//!
//! Talks to the `generateContent` REST endpoint directly and turns a JSON array of
//! formatted activity events into a prose summary.

use super::prompt::build_prompt;
use crate::Result;
use crate::http::{FetchPolicy, resilient_fetch};
use crate::report::NO_ACTIVITY_MESSAGE;
use crate::truncate::truncate;
use core::fmt::{Display, Formatter};
use core::time::Duration;
use ohno::{IntoAppError, bail};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "  gemini";

/// Default base URL for the Generative Language API
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default per-attempt timeout for generation requests
pub const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest summary kept, in characters (Discord's embed description limit)
pub const MAX_SUMMARY_CHARS: usize = 4096;

/// Largest accepted events document, in bytes
pub const MAX_EVENTS_JSON_BYTES: usize = 1024 * 1024;

const TEMPERATURE: f64 = 1.2;
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Connection settings for [`Client`]
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_summary_chars: usize,
    pub fetch_policy: FetchPolicy,
}

impl GeminiSettings {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_API_URL.to_string(),
            max_summary_chars: MAX_SUMMARY_CHARS,
            fetch_policy: FetchPolicy::with_timeout(DEFAULT_GEMINI_TIMEOUT),
        }
    }
}

/// The events document handed to [`Client::summarize`] is unusable.
#[derive(Debug)]
pub enum SummaryInputError {
    Malformed(serde_json::Error),
    NotAnArray,
    TooLarge { size: usize, max: usize },
}

impl Display for SummaryInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "events are not valid JSON: {e}"),
            Self::NotAnArray => f.write_str("events must be a JSON array"),
            Self::TooLarge { size, max } => write!(f, "events document is {size} bytes, the limit is {max} bytes"),
        }
    }
}

impl core::error::Error for SummaryInputError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            Self::NotAnArray | Self::TooLarge { .. } => None,
        }
    }
}

/// Check that `events_json` is a reasonably sized JSON array and return its length.
pub fn validate_events_json(events_json: &str, max_bytes: usize) -> Result<usize, SummaryInputError> {
    if events_json.len() > max_bytes {
        return Err(SummaryInputError::TooLarge {
            size: events_json.len(),
            max: max_bytes,
        });
    }

    match serde_json::from_str::<serde_json::Value>(events_json).map_err(SummaryInputError::Malformed)? {
        serde_json::Value::Array(events) => Ok(events.len()),
        _ => Err(SummaryInputError::NotAnArray),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    model: String,
    base_url: String,
    max_summary_chars: usize,
    fetch_policy: FetchPolicy,
}

impl Client {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let mut key_val = HeaderValue::from_str(&settings.api_key)?;
        key_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-goog-api-key", key_val);

        let client = reqwest::Client::builder()
            .user_agent(concat!("daily-reporter/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            model: settings.model,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_summary_chars: settings.max_summary_chars,
            fetch_policy: settings.fetch_policy,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Summarize a JSON array of formatted activity events.
    ///
    /// An empty array yields the no-activity message without calling the model. The
    /// summary is truncated at a sentence boundary to the configured maximum length.
    pub async fn summarize(&self, events_json: &str) -> Result<String> {
        let count = validate_events_json(events_json, MAX_EVENTS_JSON_BYTES).into_app_err("invalid input for daily summary")?;
        if count == 0 {
            return Ok(NO_ACTIVITY_MESSAGE.to_string());
        }

        let prompt = build_prompt(events_json);
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let model = &self.model;
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        let request = self
            .client
            .post(&url)
            .json(&body)
            .build()
            .into_app_err_with(|| format!("could not build request for '{url}'"))?;

        log::info!(target: LOG_TARGET, "Asking {model} to summarize {count} events");

        let response = resilient_fetch(&self.client, request, &self.fetch_policy)
            .await
            .into_app_err_with(|| format!("could not generate summary with model '{model}'"))?;

        let response: GenerateContentResponse = response
            .json()
            .into_app_err_with(|| format!("could not decode response from model '{model}'"))?;

        let summary = extract_text(&response);
        if summary.is_empty() {
            bail!("empty response from model '{model}'");
        }

        let chars = summary.chars().count();
        let truncated = truncate(&summary, self.max_summary_chars);
        if truncated.len() < summary.len() {
            log::debug!(target: LOG_TARGET, "Truncated summary from {chars} to {} characters", truncated.chars().count());
        }

        Ok(truncated.to_string())
    }
}

/// Concatenate the text parts of every candidate and trim the result.
pub(crate) fn extract_text(response: &GenerateContentResponse) -> String {
    let text: String = response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    text.trim().to_string()
}

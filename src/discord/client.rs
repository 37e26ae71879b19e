//! Discord webhook client

use crate::Result;
use crate::http::{FetchPolicy, resilient_fetch};
use crate::truncate::truncate;
use chrono::{DateTime, SecondsFormat, Utc};
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, bail};
use reqwest::StatusCode;
use serde::Serialize;

const LOG_TARGET: &str = " discord";

/// Embed color of daily reports
pub const REPORT_COLOR: u32 = 0x72_89DA;

/// Embed color of error notifications
pub const ERROR_COLOR: u32 = 0xFF_0000;

/// Discord's limit on an embed description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 4096;

/// Default per-attempt timeout for webhook posts
pub const DEFAULT_DISCORD_TIMEOUT: Duration = Duration::from_secs(10);

pub const REPORT_TITLE: &str = "GitHub Daily";
pub const ERROR_TITLE: &str = "GitHub Daily Reporter - Error";
pub const FOOTER_TEXT: &str = "GitHub Daily Reporter";

/// Connection settings for [`Client`]
#[derive(Debug, Clone)]
pub struct DiscordSettings {
    pub webhook_url: String,
    pub fetch_policy: FetchPolicy,
}

impl DiscordSettings {
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            fetch_policy: FetchPolicy::with_timeout(DEFAULT_DISCORD_TIMEOUT),
        }
    }
}

/// Body of a webhook execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    /// Build an embed whose description is cut to Discord's limit at a sentence boundary.
    #[must_use]
    pub fn new(title: &str, description: &str, color: u32, now: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            description: truncate(description, MAX_DESCRIPTION_CHARS).to_string(),
            color,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            footer: Some(EmbedFooter {
                text: FOOTER_TEXT.to_string(),
            }),
        }
    }
}

/// Discord webhook client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    webhook_url: String,
    fetch_policy: FetchPolicy,
}

impl Client {
    pub fn new(settings: DiscordSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("daily-reporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            webhook_url: settings.webhook_url,
            fetch_policy: settings.fetch_policy,
        })
    }

    /// Post the daily report.
    pub async fn post_report(&self, text: &str) -> Result<()> {
        let embed = Embed::new(REPORT_TITLE, text, REPORT_COLOR, Utc::now());
        self.send_embed(embed).await.map_err(|e| e.enrich("could not post daily report to Discord"))
    }

    /// Post an error notification.
    pub async fn post_error(&self, text: &str) -> Result<()> {
        let embed = Embed::new(ERROR_TITLE, &format!("Error occurred: {text}"), ERROR_COLOR, Utc::now());
        self.send_embed(embed).await.map_err(|e| e.enrich("could not post error notification to Discord"))
    }

    async fn send_embed(&self, embed: Embed) -> Result<()> {
        log::debug!(target: LOG_TARGET, "Posting '{}' embed to webhook", embed.title);

        let payload = WebhookPayload { embeds: vec![embed] };

        let request = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .build()
            .into_app_err("could not build webhook request")?;

        let response = resilient_fetch(&self.client, request, &self.fetch_policy).await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            bail!("unexpected status code: {status}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200, 0).unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = DiscordSettings::new("https://discord.com/api/webhooks/123/abc");
        assert_eq!(settings.webhook_url, "https://discord.com/api/webhooks/123/abc");
        assert_eq!(settings.fetch_policy.timeout, DEFAULT_DISCORD_TIMEOUT);
    }

    #[test]
    fn test_client_new() {
        let client = Client::new(DiscordSettings::new("https://discord.com/api/webhooks/123/abc"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_embed_structure() {
        let embed = Embed::new(REPORT_TITLE, "Today was busy.", REPORT_COLOR, at());

        assert_eq!(embed.title, "GitHub Daily");
        assert_eq!(embed.description, "Today was busy.");
        assert_eq!(embed.color, 0x72_89DA);
        assert_eq!(embed.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(embed.footer.as_ref().map(|f| f.text.as_str()), Some("GitHub Daily Reporter"));
    }

    #[test]
    fn test_embed_truncates_description() {
        let sentence = "This sentence is repeated many times. ";
        let long = sentence.repeat(200);
        assert!(long.chars().count() > MAX_DESCRIPTION_CHARS);

        let embed = Embed::new(REPORT_TITLE, &long, REPORT_COLOR, at());
        assert!(embed.description.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(embed.description.ends_with('.'));
    }

    #[test]
    fn test_webhook_payload_serialization() {
        let payload = WebhookPayload {
            embeds: vec![Embed::new(ERROR_TITLE, "boom", ERROR_COLOR, at())],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "embeds": [{
                    "title": "GitHub Daily Reporter - Error",
                    "description": "boom",
                    "color": 16_711_680,
                    "timestamp": "2024-01-01T00:00:00Z",
                    "footer": {"text": "GitHub Daily Reporter"},
                }]
            })
        );
    }

    #[test]
    fn test_embed_without_footer_omits_field() {
        let mut embed = Embed::new(REPORT_TITLE, "x", REPORT_COLOR, at());
        embed.footer = None;

        let value = serde_json::to_value(&embed).unwrap();
        assert!(value.get("footer").is_none());
    }
}

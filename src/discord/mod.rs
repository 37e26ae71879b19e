//! Delivery of reports and error notifications through a Discord webhook.

mod client;

pub use client::{
    Client, DEFAULT_DISCORD_TIMEOUT, DiscordSettings, ERROR_COLOR, ERROR_TITLE, Embed, EmbedFooter, FOOTER_TEXT, MAX_DESCRIPTION_CHARS,
    REPORT_COLOR, REPORT_TITLE, WebhookPayload,
};

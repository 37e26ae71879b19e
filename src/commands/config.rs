//! Command-line and environment configuration.

use super::logging::LogLevel;
use crate::Result;
use crate::discord::{DEFAULT_DISCORD_TIMEOUT, DiscordSettings};
use crate::gemini::{DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_TIMEOUT, GeminiSettings};
use crate::github::{DEFAULT_EVENTS_PER_PAGE, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_TIMEOUT, GitHubSettings};
use crate::http::{DEFAULT_MAX_RETRIES, FetchPolicy};
use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::io::ErrorKind;
use std::path::Path;
use url::Url;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug, Clone)]
#[command(name = "daily-reporter", author, version, long_about = None)]
#[command(about = "Post an AI-written summary of a GitHub user's last 24 hours to Discord")]
#[command(styles = CLAP_STYLES)]
pub struct Args {
    /// GitHub user whose activity is reported
    #[arg(long, value_name = "USER", env = "GH_USER")]
    pub gh_user: Option<String>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GH_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Gemini API key
    #[arg(long, value_name = "KEY", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model used for the summary [default: gemini-2.5-flash]
    #[arg(long, value_name = "MODEL", env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Discord webhook receiving the report
    #[arg(long, value_name = "URL", env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook_url: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, value_name = "URL", default_value = DEFAULT_GITHUB_API_URL, help_heading = "Endpoints")]
    pub github_api_url: String,

    /// Base URL of the Generative Language API
    #[arg(long, value_name = "URL", default_value = DEFAULT_GEMINI_API_URL, help_heading = "Endpoints")]
    pub gemini_api_url: String,

    /// Per-attempt timeout for GitHub requests
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_GITHUB_TIMEOUT.as_secs(), help_heading = "Tuning")]
    pub github_timeout: u64,

    /// Per-attempt timeout for Gemini requests
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_GEMINI_TIMEOUT.as_secs(), help_heading = "Tuning")]
    pub gemini_timeout: u64,

    /// Per-attempt timeout for Discord requests
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_DISCORD_TIMEOUT.as_secs(), help_heading = "Tuning")]
    pub discord_timeout: u64,

    /// Retries after a transient failure, on top of the first attempt
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_RETRIES, help_heading = "Tuning")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further retry
    #[arg(long, value_name = "MILLIS", default_value = "1000", help_heading = "Tuning")]
    pub retry_base_delay_ms: u64,

    /// Ceiling for any single retry delay
    #[arg(long, value_name = "MILLIS", default_value = "30000", help_heading = "Tuning")]
    pub retry_max_delay_ms: u64,

    /// Number of events requested from GitHub
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = DEFAULT_EVENTS_PER_PAGE,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help_heading = "Tuning"
    )]
    pub events_per_page: u8,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

/// Validated settings for the three collaborators
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubSettings,
    pub gemini: GeminiSettings,
    pub discord: DiscordSettings,
}

impl Config {
    /// Check the parsed arguments and build the per-collaborator settings.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a required value is missing or empty,
    /// or when the webhook is not an http(s) URL. A missing or blank model selects
    /// [`DEFAULT_GEMINI_MODEL`].
    pub fn from_args(args: &Args) -> Result<Self> {
        let username = required(args.gh_user.as_deref(), "GH_USER")?;
        let token = required(args.gh_token.as_deref(), "GH_TOKEN")?;
        let api_key = required(args.gemini_api_key.as_deref(), "GEMINI_API_KEY")?;
        let model = optional(args.gemini_model.as_deref()).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let webhook_url = required(args.discord_webhook_url.as_deref(), "DISCORD_WEBHOOK_URL")?;
        validate_webhook_url(&webhook_url)?;

        let policy = |timeout_secs: u64| FetchPolicy {
            timeout: Duration::from_secs(timeout_secs),
            max_retries: args.max_retries,
            base_delay: Duration::from_millis(args.retry_base_delay_ms),
            max_delay: Duration::from_millis(args.retry_max_delay_ms),
        };

        let mut github = GitHubSettings::new(username, token);
        github.base_url.clone_from(&args.github_api_url);
        github.per_page = args.events_per_page;
        github.fetch_policy = policy(args.github_timeout);

        let mut gemini = GeminiSettings::new(api_key);
        gemini.model = model;
        gemini.base_url.clone_from(&args.gemini_api_url);
        gemini.fetch_policy = policy(args.gemini_timeout);

        let mut discord = DiscordSettings::new(webhook_url);
        discord.fetch_policy = policy(args.discord_timeout);

        Ok(Self { github, gemini, discord })
    }
}

/// Load `KEY=value` pairs from `path` into the process environment.
///
/// Variables already set are left alone. A missing file is fine; an unreadable or
/// malformed one is an error.
pub fn load_env_file(path: &Path) -> Result<()> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).into_app_err_with(|| format!("could not load '{}'", path.display())),
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required(value: Option<&str>, var: &str) -> Result<String> {
    match optional(value) {
        Some(v) => Ok(v),
        None => bail!("{var} environment variable is required"),
    }
}

// The URL embeds the webhook secret, so it never appears in error messages.
fn validate_webhook_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).into_app_err("DISCORD_WEBHOOK_URL is not a valid URL")?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("DISCORD_WEBHOOK_URL must use http or https, found '{}'", url.scheme());
    }

    Ok(())
}

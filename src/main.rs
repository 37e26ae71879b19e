//! Post a daily summary of GitHub activity to Discord.
//!
//! `daily-reporter` fetches the public and private events of a GitHub user from the
//! last 24 hours, has Gemini write a short summary of them, and posts the summary as
//! an embed to a Discord webhook. It is meant to be run once a day from a scheduler
//! such as cron or a CI workflow.
//!
//! # Configuration
//!
//! Settings come from command-line options or their environment variables. A `.env`
//! file in the working directory is loaded first when present.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `GH_USER`             | GitHub user whose activity is reported    |
//! | `GH_TOKEN`            | GitHub personal access token              |
//! | `GEMINI_API_KEY`      | Gemini API key                            |
//! | `GEMINI_MODEL`        | Gemini model, `gemini-2.5-flash` default  |
//! | `DISCORD_WEBHOOK_URL` | Discord webhook receiving the report      |
//!
//! Run `daily-reporter --help` for the tuning options.
//!
//! # Exit status
//!
//! The process exits with status 1 when the report could not be produced. The failure
//! is also posted to the webhook when possible.

use daily_reporter::commands::load_env_file;
use daily_reporter::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};
use std::path::Path;

/// Default host that talks to the real process streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    load_env_file(Path::new(".env"))?;
    run(&mut RealHost, std::env::args()).await
}

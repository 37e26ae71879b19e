//! Entry point for the daily-reporter command

use super::config::{Args, Config};
use super::logging::init_logging;
use crate::report::run_report;
use crate::{Host, Result, discord, gemini, github};
use chrono::Utc;
use clap::Parser;
use std::io::Write;

/// Parse `args`, run the daily report once, and report the outcome to `host`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the report could not be produced.
/// In the latter case the failure has already been posted to Discord and `host.exit(1)`
/// has been called.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let args = Args::parse_from(args);
    init_logging(args.log_level);

    let config = Config::from_args(&args)?;

    let mut github = github::Client::new(config.github, Utc::now())?;
    let gemini = gemini::Client::new(config.gemini)?;
    let discord = discord::Client::new(config.discord)?;

    match run_report(&mut github, &gemini, &discord).await {
        Ok(()) => {
            let _ = writeln!(host.output(), "Daily report sent for '{}'", github.username());
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Daily report failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    #[tokio::test]
    async fn test_invalid_config_does_not_exit() {
        let mut host = TestHost::default();
        let result = run(
            &mut host,
            [
                "daily-reporter",
                "--gh-user",
                "testuser",
                "--gh-token",
                "testtoken",
                "--gemini-api-key",
                "testkey",
                "--discord-webhook-url",
                "not a url",
                "--log-level",
                "none",
            ],
        )
        .await;

        assert!(result.is_err());
        assert!(host.exit_code.is_none());
        assert!(host.error_str().is_empty());
        assert!(host.output_buf.is_empty());
    }
}

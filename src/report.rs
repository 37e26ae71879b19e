//! The daily report pipeline: fetch → summarize → post.

use crate::github::FormattedActivityEvent;
use crate::{Result, discord, gemini, github};
use ohno::{EnrichableExt, IntoAppError};

const LOG_TARGET: &str = "  report";

/// Posted instead of a summary on days without any activity.
pub const NO_ACTIVITY_MESSAGE: &str = "Hoje foi um dia de planejamento e reflexão no código.";

/// Source of the day's formatted activity events.
pub trait ActivitySource {
    fn daily_events(&mut self) -> impl Future<Output = Result<Vec<FormattedActivityEvent>>>;
}

/// Turns a JSON array of formatted events into prose.
pub trait Summarizer {
    fn summarize(&self, events_json: &str) -> impl Future<Output = Result<String>>;
}

/// Delivers reports and error notifications.
pub trait Notifier {
    fn post_report(&self, text: &str) -> impl Future<Output = Result<()>>;

    fn post_error(&self, text: &str) -> impl Future<Output = Result<()>>;
}

impl ActivitySource for github::Client {
    async fn daily_events(&mut self) -> Result<Vec<FormattedActivityEvent>> {
        self.get_daily_events().await
    }
}

impl Summarizer for gemini::Client {
    async fn summarize(&self, events_json: &str) -> Result<String> {
        Self::summarize(self, events_json).await
    }
}

impl Notifier for discord::Client {
    async fn post_report(&self, text: &str) -> Result<()> {
        Self::post_report(self, text).await
    }

    async fn post_error(&self, text: &str) -> Result<()> {
        Self::post_error(self, text).await
    }
}

/// Run the pipeline once, reporting any failure through `notifier`.
///
/// The failure is returned to the caller after the notification attempt; a failure
/// while notifying is only logged.
pub async fn run_report<A, S, N>(source: &mut A, summarizer: &S, notifier: &N) -> Result<()>
where
    A: ActivitySource,
    S: Summarizer,
    N: Notifier,
{
    match produce_report(source, summarizer, notifier).await {
        Ok(()) => {
            log::info!(target: LOG_TARGET, "Report sent successfully");
            Ok(())
        }
        Err(e) => {
            log::error!(target: LOG_TARGET, "Could not produce the daily report: {e:#}");

            if let Err(notify_err) = notifier.post_error(&format!("{e:#}")).await {
                log::error!(target: LOG_TARGET, "Could not send the error notification: {notify_err:#}");
            }

            Err(e)
        }
    }
}

async fn produce_report<A, S, N>(source: &mut A, summarizer: &S, notifier: &N) -> Result<()>
where
    A: ActivitySource,
    S: Summarizer,
    N: Notifier,
{
    log::info!(target: LOG_TARGET, "Fetching GitHub events");
    let events = source
        .daily_events()
        .await
        .map_err(|e| e.enrich("failed to fetch GitHub events"))?;

    log::info!(target: LOG_TARGET, "Found {} events in the last 24 hours", events.len());

    if events.is_empty() {
        log::info!(target: LOG_TARGET, "No events found, sending the no-activity message");
        return notifier
            .post_report(NO_ACTIVITY_MESSAGE)
            .await
            .map_err(|e| e.enrich("failed to send report"));
    }

    let events_json = serde_json::to_string_pretty(&events).into_app_err("failed to serialize events")?;

    log::info!(target: LOG_TARGET, "Generating summary");
    let summary = summarizer
        .summarize(&events_json)
        .await
        .map_err(|e| e.enrich("failed to generate summary"))?;

    log::info!(target: LOG_TARGET, "Generated summary ({} characters)", summary.chars().count());

    notifier.post_report(&summary).await.map_err(|e| e.enrich("failed to send report"))
}

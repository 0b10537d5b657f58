use super::mapper::to_scheduled_event_request;
use super::report::SyncReport;
use super::{CalendarReader, EventPublisher};
use crate::error::{BotResult, Error};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Composes reader, mapper and publisher into one sync pass.
///
/// Holds no state between invocations; the calendar is the source of truth
/// on every run, and re-running may create duplicates.
pub struct SyncOrchestrator {
    reader: Arc<dyn CalendarReader>,
    publisher: Arc<dyn EventPublisher>,
    cancel: CancellationToken,
}

impl SyncOrchestrator {
    pub fn new(reader: Arc<dyn CalendarReader>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            reader,
            publisher,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an external cancellation token; cancellation takes effect at the
    /// next per-event loop boundary, never mid-call
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sync up to `max` upcoming events using the current time as bound
    pub async fn sync(&self, max: usize) -> BotResult<SyncReport> {
        self.sync_from(max, Utc::now()).await
    }

    /// Sync up to `max` events upcoming relative to `now`.
    ///
    /// A fetch failure aborts the whole batch. After that, every event gets
    /// exactly one result entry and no single event can abort the rest:
    /// mapping failures record Failed, a publisher past-start rejection
    /// records Skipped, other publish failures record Failed. Events are
    /// processed strictly in the calendar's chronological order, one at a
    /// time, to keep rate-limit behavior predictable and output order
    /// stable.
    pub async fn sync_from(&self, max: usize, now: DateTime<Utc>) -> BotResult<SyncReport> {
        let events = self.reader.fetch_upcoming(max, now).await?;

        info!("Fetched {} upcoming event(s) to sync", events.len());

        let mut report = SyncReport::default();

        for event in events {
            if self.cancel.is_cancelled() {
                warn!("Sync cancelled after {} event(s)", report.entries.len());
                report.cancelled = true;
                break;
            }

            let title = event.title().to_string();

            let request = match to_scheduled_event_request(&event) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Failed to map event '{}': {}", title, e);
                    report.push_failed(title, e.to_string());
                    continue;
                }
            };

            // The guard inside the publisher re-reads the clock: "now" can
            // have advanced past an event's start since the fetch
            match self.publisher.publish(&request, Utc::now()).await {
                Ok(id) => {
                    info!("Created scheduled event for '{}'", title);
                    report.push_created(title, id);
                }
                Err(Error::PastStart { .. }) => {
                    info!("Skipping '{}': start time already passed", title);
                    report.push_skipped(title, "start time already passed".to_string());
                }
                Err(e) => {
                    warn!("Failed to publish event '{}': {}", title, e);
                    report.push_failed(title, e.to_string());
                }
            }
        }

        Ok(report)
    }
}

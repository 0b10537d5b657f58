mod mapper;
mod orchestrator;
mod publisher;
mod report;

pub use mapper::{to_scheduled_event_request, ScheduledEventRequest};
pub use orchestrator::SyncOrchestrator;
pub use publisher::{ensure_future_start, DiscordEventPublisher, EventPublisher};
pub use report::{SyncEntry, SyncOutcome, SyncReport};

use crate::components::google_calendar::CalendarEvent;
use crate::error::BotResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only source of upcoming calendar events.
///
/// `now` is the lower bound for "upcoming" and is a parameter rather than
/// the wall clock so tests can pin it.
#[async_trait]
pub trait CalendarReader: Send + Sync {
    async fn fetch_upcoming(
        &self,
        max: usize,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>>;
}

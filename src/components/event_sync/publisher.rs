use super::mapper::ScheduledEventRequest;
use crate::error::{publish_error, BotResult, Error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    CreateScheduledEvent, GuildId, ScheduledEventId, ScheduledEventType, Timestamp,
};
use serenity::http::Http;
use std::sync::Arc;
use tracing::debug;

/// Location used when the calendar event has none; Discord requires a
/// location for external scheduled events
const FALLBACK_LOCATION: &str = "See description";

/// Sink for mapped scheduled-event requests
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Submit one request. `now` is the instant the past-start guard checks
    /// against; it must be taken at publish time, not fetch time, because
    /// the clock advances over a slow batch.
    async fn publish(
        &self,
        request: &ScheduledEventRequest,
        now: DateTime<Utc>,
    ) -> BotResult<ScheduledEventId>;
}

/// Reject requests whose start already passed. The platform refuses
/// past-dated events, so this is checked before the network call.
pub fn ensure_future_start(request: &ScheduledEventRequest, now: DateTime<Utc>) -> BotResult<()> {
    if request.start < now {
        return Err(Error::PastStart {
            start: request.start,
            now,
        });
    }
    Ok(())
}

/// Publishes scheduled events to a Discord guild over the HTTP API
pub struct DiscordEventPublisher {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordEventPublisher {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl EventPublisher for DiscordEventPublisher {
    async fn publish(
        &self,
        request: &ScheduledEventRequest,
        now: DateTime<Utc>,
    ) -> BotResult<ScheduledEventId> {
        ensure_future_start(request, now)?;

        let start = to_timestamp(request.start)?;
        let end = to_timestamp(request.end)?;

        let location = if request.location.is_empty() {
            FALLBACK_LOCATION
        } else {
            request.location.as_str()
        };

        let mut event = CreateScheduledEvent::new(ScheduledEventType::External, &request.title, start)
            .location(location)
            .end_time(end);

        if !request.description.is_empty() {
            event = event.description(&request.description);
        }

        let created = self
            .http
            .create_scheduled_event(self.guild_id, &event, None)
            .await
            .map_err(|e| publish_error(&e.to_string()))?;

        debug!(
            "Created scheduled event {} ({}) in guild {}",
            request.title, created.id, self.guild_id
        );

        Ok(created.id)
    }
}

fn to_timestamp(instant: DateTime<Utc>) -> BotResult<Timestamp> {
    Timestamp::from_unix_timestamp(instant.timestamp())
        .map_err(|e| publish_error(&format!("Invalid timestamp {}: {}", instant, e)))
}

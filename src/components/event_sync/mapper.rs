use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::{event_end, event_start};
use crate::error::{mapping_error, BotResult};
use chrono::{DateTime, Duration, Utc};

/// Discord limit for scheduled event names
pub const MAX_TITLE_LEN: usize = 100;
/// Discord limit for scheduled event descriptions
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Discord limit for external event locations
pub const MAX_LOCATION_LEN: usize = 100;

/// Duration assigned to events whose end time is missing
pub const DEFAULT_DURATION_HOURS: i64 = 1;

/// The minimal fields needed to create a scheduled event on the chat
/// platform. Built fresh per calendar event and discarded after submission;
/// the target guild is a publisher concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEventRequest {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub location: String,
}

/// Map one calendar event to a scheduled-event request.
///
/// Defaults are deliberate and fixed:
/// - all-day boundaries (date-only) resolve to 00:00:00 UTC on that date,
///   so a one-day all-day event spans the full day (the provider's all-day
///   end date is exclusive);
/// - a missing end becomes start + [`DEFAULT_DURATION_HOURS`];
/// - missing description/location become empty strings, never None.
///
/// Fails with a mapping error when the start is missing or when the
/// interval is degenerate (start >= end) after defaulting.
pub fn to_scheduled_event_request(event: &CalendarEvent) -> BotResult<ScheduledEventRequest> {
    let start = event_start(event)?
        .ok_or_else(|| mapping_error("Event has no start time"))?
        .resolve();

    let end = match event_end(event)? {
        Some(end) => end.resolve(),
        None => start + Duration::hours(DEFAULT_DURATION_HOURS),
    };

    if start >= end {
        return Err(mapping_error(&format!(
            "Degenerate interval: start {} is not before end {}",
            start, end
        )));
    }

    let title = truncate_chars(event.title(), MAX_TITLE_LEN);

    let description = event.description.clone().unwrap_or_default();
    let location = event.location.clone().unwrap_or_default();

    // Location goes into the description body as well, since the dedicated
    // location field is capped short
    let full_description = if location.is_empty() {
        description
    } else if description.is_empty() {
        format!("Location: {}", location)
    } else {
        format!("{}\n\nLocation: {}", description, location)
    };

    Ok(ScheduledEventRequest {
        title,
        start,
        end,
        description: truncate_chars(&full_description, MAX_DESCRIPTION_LEN),
        location: truncate_chars(&location, MAX_LOCATION_LEN),
    })
}

/// Truncate to at most `max` characters, marking the cut with an ellipsis
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

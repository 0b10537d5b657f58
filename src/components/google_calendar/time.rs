use super::models::CalendarEvent;
use crate::error::{mapping_error, BotResult};
use chrono::{DateTime, NaiveDate, Utc};

/// A calendar instant: either an exact moment or a date-only (all-day) marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// Timed event boundary
    At(DateTime<Utc>),
    /// All-day event boundary (no time-of-day from the provider)
    AllDay(NaiveDate),
}

impl EventTime {
    /// Resolve to a concrete instant; all-day boundaries resolve to
    /// 00:00:00 UTC on that date.
    pub fn resolve(self) -> DateTime<Utc> {
        match self {
            EventTime::At(dt) => dt,
            EventTime::AllDay(date) => date
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time")
                .and_utc(),
        }
    }
}

/// Get event start as an EventTime, if the event carries one
pub fn event_start(event: &CalendarEvent) -> BotResult<Option<EventTime>> {
    parse_boundary(
        event.start_date_time.as_deref(),
        event.start_date.as_deref(),
        "start",
    )
}

/// Get event end as an EventTime, if the event carries one
pub fn event_end(event: &CalendarEvent) -> BotResult<Option<EventTime>> {
    parse_boundary(
        event.end_date_time.as_deref(),
        event.end_date.as_deref(),
        "end",
    )
}

fn parse_boundary(
    date_time: Option<&str>,
    date: Option<&str>,
    which: &str,
) -> BotResult<Option<EventTime>> {
    if let Some(dt) = date_time {
        let parsed = DateTime::parse_from_rfc3339(dt)
            .map_err(|e| mapping_error(&format!("Failed to parse {} datetime '{}': {}", which, dt, e)))?;
        Ok(Some(EventTime::At(parsed.with_timezone(&Utc))))
    } else if let Some(d) = date {
        let parsed = NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|e| mapping_error(&format!("Failed to parse {} date '{}': {}", which, d, e)))?;
        Ok(Some(EventTime::AllDay(parsed)))
    } else {
        Ok(None)
    }
}

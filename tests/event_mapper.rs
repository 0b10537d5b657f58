use calbridge::components::event_sync::to_scheduled_event_request;
use calbridge::components::google_calendar::models::CalendarEvent;
use calbridge::error::Error;
use chrono::{Duration, TimeZone, Utc};

fn base_event() -> CalendarEvent {
    CalendarEvent {
        id: "event1".to_string(),
        summary: Some("Board meeting".to_string()),
        description: Some("Quarterly review".to_string()),
        location: Some("Room 12".to_string()),
        status: Some("confirmed".to_string()),
        start_date_time: Some("2025-06-01T10:00:00+00:00".to_string()),
        end_date_time: Some("2025-06-01T11:30:00+00:00".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_maps_timed_event() {
    let request = to_scheduled_event_request(&base_event()).unwrap();

    assert_eq!(request.title, "Board meeting");
    assert_eq!(request.start, Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap());
    assert_eq!(request.end, Utc.with_ymd_and_hms(2025, 6, 1, 11, 30, 0).unwrap());
    assert_eq!(request.location, "Room 12");
    assert!(request.description.contains("Quarterly review"));
    assert!(request.description.contains("Location: Room 12"));
}

/// An all-day event gets midnight-UTC boundaries and is never degenerate:
/// the provider's exclusive end date puts the end a full day after the start
#[test]
fn test_all_day_event_has_positive_duration() {
    let event = CalendarEvent {
        id: "allday".to_string(),
        summary: Some("Club open day".to_string()),
        start_date: Some("2025-06-01".to_string()),
        end_date: Some("2025-06-02".to_string()),
        ..Default::default()
    };

    let request = to_scheduled_event_request(&event).unwrap();

    assert_eq!(request.start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    assert_eq!(request.end, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
    assert!(request.start < request.end);
}

/// A missing end defaults to start + 1 hour
#[test]
fn test_missing_end_defaults_to_one_hour() {
    let mut event = base_event();
    event.end_date_time = None;

    let request = to_scheduled_event_request(&event).unwrap();
    assert_eq!(request.end, request.start + Duration::hours(1));
}

/// Missing description and location map to empty strings, never None
#[test]
fn test_missing_optional_fields_become_empty() {
    let mut event = base_event();
    event.description = None;
    event.location = None;

    let request = to_scheduled_event_request(&event).unwrap();
    assert_eq!(request.description, "");
    assert_eq!(request.location, "");
}

#[test]
fn test_missing_title_gets_default() {
    let mut event = base_event();
    event.summary = None;

    let request = to_scheduled_event_request(&event).unwrap();
    assert_eq!(request.title, "Untitled event");
}

/// start >= end after defaulting is a mapping error
#[test]
fn test_degenerate_interval_is_mapping_error() {
    let mut event = base_event();
    event.end_date_time = Some("2025-06-01T09:00:00+00:00".to_string());

    let result = to_scheduled_event_request(&event);
    assert!(matches!(result, Err(Error::Mapping(_))));
}

#[test]
fn test_missing_start_is_mapping_error() {
    let mut event = base_event();
    event.start_date_time = None;
    event.start_date = None;

    let result = to_scheduled_event_request(&event);
    assert!(matches!(result, Err(Error::Mapping(_))));
}

#[test]
fn test_unparsable_end_is_mapping_error() {
    let mut event = base_event();
    event.end_date_time = Some("not-a-timestamp".to_string());

    let result = to_scheduled_event_request(&event);
    assert!(matches!(result, Err(Error::Mapping(_))));
}

/// Titles and descriptions are clipped to the platform's field limits
#[test]
fn test_long_fields_truncated() {
    let mut event = base_event();
    event.summary = Some("x".repeat(250));
    event.description = Some("y".repeat(2000));

    let request = to_scheduled_event_request(&event).unwrap();
    assert_eq!(request.title.chars().count(), 100);
    assert!(request.title.ends_with("..."));
    assert_eq!(request.description.chars().count(), 1000);
}

use calbridge::commands::parse_count;
use calbridge::components::event_sync::{ensure_future_start, ScheduledEventRequest};
use calbridge::components::google_calendar::models::CalendarEvent;
use calbridge::config::Config;
use calbridge::error::Error;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

fn test_config() -> Config {
    Config {
        discord_token: String::new(),
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_refresh_token: String::new(),
        google_calendar_id: "primary".to_string(),
        components: std::collections::HashMap::new(),
        timezone: "UTC".to_string(),
        activity: "Testing".to_string(),
    }
}

/// Smoke test to verify that a config can be constructed and shared
#[tokio::test]
async fn test_config_shared_access() {
    let config = Arc::new(RwLock::new(Config {
        discord_token: "test_token".to_string(),
        ..test_config()
    }));

    let discord_token = {
        let config_guard = config.read().await;
        config_guard.discord_token.clone()
    };

    assert_eq!(discord_token, "test_token");
    assert_eq!(config.read().await.google_calendar_id, "primary");
}

#[test]
fn test_component_default_enabled() {
    let mut config = test_config();
    config
        .components
        .insert("google_calendar".to_string(), true);

    assert!(config.is_component_enabled("google_calendar"));
    assert!(!config.is_component_enabled("nonexistent"));
}

/// Count arguments fall back to the default on anything non-numeric or
/// non-positive instead of erroring
#[test]
fn test_parse_count_fallbacks() {
    assert_eq!(parse_count(None, 10), 10);
    assert_eq!(parse_count(Some("3"), 10), 3);
    assert_eq!(parse_count(Some(" 7 "), 10), 7);
    assert_eq!(parse_count(Some("abc"), 10), 10);
    assert_eq!(parse_count(Some("-2"), 10), 10);
    assert_eq!(parse_count(Some("0"), 5), 5);
    assert_eq!(parse_count(Some(""), 5), 5);
}

#[test]
fn test_calendar_event_helpers() {
    let event = CalendarEvent {
        id: "event1".to_string(),
        summary: None,
        status: Some("cancelled".to_string()),
        ..Default::default()
    };

    assert!(event.is_cancelled());
    assert_eq!(event.title(), "Untitled event");

    let named = CalendarEvent {
        summary: Some("Test Event".to_string()),
        status: Some("confirmed".to_string()),
        ..Default::default()
    };
    assert!(!named.is_cancelled());
    assert_eq!(named.title(), "Test Event");
}

/// The publisher-side guard rejects past starts and accepts future ones
#[test]
fn test_past_start_guard() {
    let now = Utc::now();
    let mut request = ScheduledEventRequest {
        title: "Test".to_string(),
        start: now + Duration::hours(1),
        end: now + Duration::hours(2),
        description: String::new(),
        location: String::new(),
    };

    assert!(ensure_future_start(&request, now).is_ok());

    request.start = now - Duration::seconds(1);
    assert!(matches!(
        ensure_future_start(&request, now),
        Err(Error::PastStart { .. })
    ));
}

use async_trait::async_trait;
use calbridge::components::event_sync::{
    ensure_future_start, CalendarReader, EventPublisher, ScheduledEventRequest, SyncOrchestrator,
    SyncOutcome,
};
use calbridge::components::google_calendar::models::CalendarEvent;
use calbridge::components::google_calendar::select_upcoming;
use calbridge::error::{auth_error, publish_error, BotResult, Error};
use chrono::{DateTime, Duration, Utc};
use serenity::all::ScheduledEventId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Calendar reader backed by a fixed event list, applying the same
/// selection rules as the real reader
struct MockReader {
    events: Vec<CalendarEvent>,
    fail_with: Option<fn() -> Error>,
}

impl MockReader {
    fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            fail_with: None,
        }
    }

    fn failing(fail_with: fn() -> Error) -> Self {
        Self {
            events: Vec::new(),
            fail_with: Some(fail_with),
        }
    }
}

#[async_trait]
impl CalendarReader for MockReader {
    async fn fetch_upcoming(
        &self,
        max: usize,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>> {
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(select_upcoming(self.events.clone(), max, now))
    }
}

/// Publisher that records requests and can fail on selected titles
#[derive(Default)]
struct MockPublisher {
    fail_titles: Vec<String>,
    published: Mutex<Vec<ScheduledEventRequest>>,
    next_id: AtomicU64,
}

impl MockPublisher {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    fn failing_on(titles: &[&str]) -> Self {
        Self {
            fail_titles: titles.iter().map(|t| t.to_string()).collect(),
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(
        &self,
        request: &ScheduledEventRequest,
        now: DateTime<Utc>,
    ) -> BotResult<ScheduledEventId> {
        ensure_future_start(request, now)?;

        if self.fail_titles.contains(&request.title) {
            return Err(publish_error("Missing Permissions"));
        }

        self.published.lock().unwrap().push(request.clone());
        Ok(ScheduledEventId::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
        ))
    }
}

fn timed_event(id: &str, title: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(title.to_string()),
        start_date_time: Some(start.to_rfc3339()),
        end_date_time: end.map(|e| e.to_rfc3339()),
        ..Default::default()
    }
}

/// One malformed event among valid ones gets its own Failed entry and never
/// aborts the rest of the batch
#[tokio::test]
async fn test_malformed_event_does_not_abort_batch() {
    let now = Utc::now();
    let mut malformed = timed_event("bad", "Broken", now + Duration::hours(2), None);
    malformed.end_date_time = Some("not-a-timestamp".to_string());

    let events = vec![
        timed_event("a", "First", now + Duration::hours(1), Some(now + Duration::hours(2))),
        malformed,
        timed_event("c", "Third", now + Duration::hours(3), Some(now + Duration::hours(4))),
    ];

    let publisher = Arc::new(MockPublisher::new());
    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(events)),
        Arc::clone(&publisher) as Arc<dyn EventPublisher>,
    );

    let report = orchestrator.sync_from(10, now).await.unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.created(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.entries[1].title, "Broken");
    assert!(matches!(report.entries[1].outcome, SyncOutcome::Failed { .. }));

    // The two valid events actually reached the publisher, in order
    let published = publisher.published.lock().unwrap();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].title, "First");
    assert_eq!(published[1].title, "Third");
}

/// A request whose start already passed yields Skipped, never Created
#[tokio::test]
async fn test_past_start_is_skipped() {
    let now = Utc::now();
    let events = vec![
        timed_event("past", "Yesterday", now - Duration::hours(2), Some(now - Duration::hours(1))),
        timed_event("future", "Tomorrow", now + Duration::hours(2), Some(now + Duration::hours(3))),
    ];

    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(events)),
        Arc::new(MockPublisher::new()),
    );

    // Fetch with a reference point far enough back that the past event
    // survives the reader filter; the publisher's own clock still rejects it
    let report = orchestrator
        .sync_from(10, now - Duration::days(1))
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.created(), 1);
    assert_eq!(report.entries[0].title, "Yesterday");
    assert!(matches!(report.entries[0].outcome, SyncOutcome::Skipped { .. }));
}

/// Publish failures other than past-start are recorded as Failed and the
/// batch continues
#[tokio::test]
async fn test_publish_failure_is_isolated() {
    let now = Utc::now();
    let events = vec![
        timed_event("a", "First", now + Duration::hours(1), Some(now + Duration::hours(2))),
        timed_event("b", "Second", now + Duration::hours(2), Some(now + Duration::hours(3))),
    ];

    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(events)),
        Arc::new(MockPublisher::failing_on(&["First"])),
    );

    let report = orchestrator.sync_from(10, now).await.unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);
    match &report.entries[0].outcome {
        SyncOutcome::Failed { reason } => assert!(reason.contains("Missing Permissions")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

/// An auth failure on the initial fetch aborts the whole sync
#[tokio::test]
async fn test_fetch_auth_error_aborts_sync() {
    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::failing(|| auth_error("Credential expired"))),
        Arc::new(MockPublisher::new()),
    );

    let result = orchestrator.sync(10).await;
    assert!(matches!(result, Err(Error::Auth(_))));
}

/// Cancellation is honored at the loop boundary: a pre-cancelled token
/// produces an empty, cancelled report without touching the publisher
#[tokio::test]
async fn test_cancellation_stops_batch() {
    let now = Utc::now();
    let events = vec![timed_event(
        "a",
        "First",
        now + Duration::hours(1),
        Some(now + Duration::hours(2)),
    )];

    let cancel = CancellationToken::new();
    cancel.cancel();

    let publisher = Arc::new(MockPublisher::new());
    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(events)),
        Arc::clone(&publisher) as Arc<dyn EventPublisher>,
    )
    .with_cancellation(cancel);

    let report = orchestrator.sync_from(10, now).await.unwrap();

    assert!(report.cancelled);
    assert!(report.entries.is_empty());
    assert!(publisher.published.lock().unwrap().is_empty());
}

/// The worked example: a past event B, a valid future event A and a future
/// event C with a broken end; sync of 2 filters B at the reader, creates A
/// and fails C without aborting
#[tokio::test]
async fn test_mixed_batch_example() {
    let now = Utc::now();
    let b = timed_event("b", "B", now - Duration::hours(3), Some(now - Duration::hours(2)));
    let a = timed_event("a", "A", now + Duration::hours(1), Some(now + Duration::hours(2)));
    let mut c = timed_event("c", "C", now + Duration::hours(3), None);
    c.end_date_time = Some("garbage".to_string());

    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(vec![b, a, c])),
        Arc::new(MockPublisher::new()),
    );

    let report = orchestrator.sync_from(2, now).await.unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].title, "A");
    assert!(matches!(report.entries[0].outcome, SyncOutcome::Created { .. }));
    assert_eq!(report.entries[1].title, "C");
    assert!(matches!(report.entries[1].outcome, SyncOutcome::Failed { .. }));
}

/// Summary names failed events with their reasons
#[tokio::test]
async fn test_summary_names_failures() {
    let now = Utc::now();
    let events = vec![
        timed_event("a", "Good", now + Duration::hours(1), Some(now + Duration::hours(2))),
        timed_event("b", "Bad", now + Duration::hours(2), Some(now + Duration::hours(3))),
    ];

    let orchestrator = SyncOrchestrator::new(
        Arc::new(MockReader::new(events)),
        Arc::new(MockPublisher::failing_on(&["Bad"])),
    );

    let report = orchestrator.sync_from(10, now).await.unwrap();
    let summary = report.summary();

    assert!(summary.contains("Created 1 event(s)"));
    assert!(summary.contains("Failed 1 event(s)"));
    assert!(summary.contains("Bad"));
    assert!(summary.contains("Missing Permissions"));
}

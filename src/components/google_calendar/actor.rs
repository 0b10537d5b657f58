use super::models::CalendarEvent;
use super::time::event_start;
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{auth_error, provider_error, BotResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;
use url::Url;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    GetUpcomingEvents {
        max: usize,
        now: DateTime<Utc>,
        respond_to: mpsc::Sender<BotResult<Vec<CalendarEvent>>>,
    },
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Get the next `max` upcoming events, using `now` as the lower bound
    pub async fn get_upcoming_events(
        &self,
        max: usize,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>> {
        let (respond_to, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::GetUpcomingEvents {
                max,
                now,
                respond_to,
            })
            .await
            .map_err(|e| provider_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| provider_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(config),
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::GetUpcomingEvents {
                    max,
                    now,
                    respond_to,
                } => {
                    let result = Self::fetch_upcoming(
                        Arc::clone(&self.config),
                        self.token_manager.clone(),
                        self.client.clone(),
                        max,
                        now,
                    )
                    .await;

                    let _ = respond_to.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Fetch the next `max` upcoming events from the calendar.
    ///
    /// Asks the provider for events from `now` onward with recurring events
    /// expanded and ordered by start time, then post-filters locally: the
    /// provider's `timeMin` matches on event *end*, so events already in
    /// progress would otherwise slip through.
    pub async fn fetch_upcoming(
        config: Arc<RwLock<Config>>,
        token_manager: TokenManager,
        client: Client,
        max: usize,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>> {
        let calendar_id = {
            let config_read = config.read().await;
            config_read.google_calendar_id.clone()
        };

        let access_token = token_manager.get_access_token().await?;

        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            calendar_id
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| provider_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("timeMin", &now.to_rfc3339())
            .append_pair("maxResults", &max.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            if status.as_u16() == 401 {
                return Err(auth_error(&format!(
                    "Calendar credential rejected: HTTP {} - {}",
                    status, error_body
                )));
            }
            return Err(provider_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse events response: {}", e)))?;

        let items = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| provider_error("No items in response"))?;

        let events = items.iter().map(parse_event).collect();

        Ok(select_upcoming(events, max, now))
    }
}

/// Convert one provider event object into a CalendarEvent
fn parse_event(event: &serde_json::Value) -> CalendarEvent {
    let get_str = |value: &serde_json::Value, key: &str| {
        value.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
    };
    let get_nested = |outer: &str, inner: &str| {
        event
            .get(outer)
            .and_then(|o| o.as_object())
            .and_then(|o| o.get(inner))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    CalendarEvent {
        id: get_str(event, "id").unwrap_or_default(),
        summary: get_str(event, "summary"),
        description: get_str(event, "description"),
        location: get_str(event, "location"),
        status: get_str(event, "status"),
        start_date_time: get_nested("start", "dateTime"),
        start_date: get_nested("start", "date"),
        end_date_time: get_nested("end", "dateTime"),
        end_date: get_nested("end", "date"),
    }
}

/// Select the upcoming slice of a fetched batch: cancelled events out,
/// events starting before `now` out, ascending start order, at most `max`.
pub fn select_upcoming(
    events: Vec<CalendarEvent>,
    max: usize,
    now: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let mut upcoming: Vec<(DateTime<Utc>, CalendarEvent)> = events
        .into_iter()
        .filter(|e| !e.is_cancelled())
        .filter_map(|e| {
            let start = event_start(&e).ok().flatten()?.resolve();
            (start >= now).then_some((start, e))
        })
        .collect();

    upcoming.sort_by_key(|(start, _)| *start);
    upcoming.truncate(max);
    upcoming.into_iter().map(|(_, e)| e).collect()
}

use crate::commands::{create_error_embed, parse_count, CommandResult, Context};
use crate::components::event_sync::{DiscordEventPublisher, SyncOrchestrator};
use crate::components::google_calendar::time::{event_start, EventTime};
use crate::components::GoogleCalendarHandle;
use crate::error::other_error;
use chrono_tz::Tz;
use std::sync::Arc;

/// Default number of events a sync pass covers
const DEFAULT_SYNC_COUNT: usize = 10;
/// Default number of events shown by list_events
const DEFAULT_LIST_COUNT: usize = 5;

/// Mirror upcoming Google Calendar events into Discord scheduled events
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn sync_events(
    ctx: Context<'_>,
    #[description = "Number of events to sync (default 10)"] count: Option<String>,
) -> CommandResult {
    let count = parse_count(count.as_deref(), DEFAULT_SYNC_COUNT);

    let guild_id = ctx
        .guild_id()
        .ok_or_else(|| other_error("sync_events must be invoked from a guild"))?;

    ctx.say(format!(
        "Fetching {} upcoming events from Google Calendar...",
        count
    ))
    .await?;

    let handle = calendar_handle(&ctx).await;
    let publisher =
        DiscordEventPublisher::new(Arc::clone(&ctx.serenity_context().http), guild_id);

    let orchestrator = SyncOrchestrator::new(Arc::new(handle), Arc::new(publisher));

    let report = match orchestrator.sync(count).await {
        Ok(report) => report,
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(create_error_embed(
                        "Sync failed",
                        &format!("Could not fetch calendar events: {}", e),
                    ))
                    .ephemeral(true),
            )
            .await?;
            return Err(e);
        }
    };

    if report.is_empty() {
        ctx.say("No upcoming events found in Google Calendar.")
            .await?;
        return Ok(());
    }

    ctx.say(report.summary()).await?;

    Ok(())
}

/// List upcoming Google Calendar events
#[poise::command(slash_command, prefix_command)]
pub async fn list_events(
    ctx: Context<'_>,
    #[description = "Number of events to list (default 5)"] count: Option<String>,
) -> CommandResult {
    let count = parse_count(count.as_deref(), DEFAULT_LIST_COUNT);

    let handle = calendar_handle(&ctx).await;

    let events = match handle.get_upcoming_events(count).await {
        Ok(events) => events,
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(create_error_embed(
                        "Calendar error",
                        &format!("Could not fetch calendar events: {}", e),
                    ))
                    .ephemeral(true),
            )
            .await?;
            return Err(e);
        }
    };

    if events.is_empty() {
        ctx.say("No upcoming events found in Google Calendar.")
            .await?;
        return Ok(());
    }

    // Display timezone comes from config
    let timezone: Tz = {
        let config = ctx.data().config.read().await;
        config.timezone.parse().unwrap_or(chrono_tz::UTC)
    };

    let mut message = "📅 **Upcoming calendar events:**\n\n".to_string();
    for event in &events {
        let when = match event_start(event) {
            Ok(Some(EventTime::At(dt))) => dt
                .with_timezone(&timezone)
                .format("%a %d %b %H:%M")
                .to_string(),
            Ok(Some(EventTime::AllDay(date))) => {
                format!("{} (all day)", date.format("%a %d %b"))
            }
            _ => "Unknown time".to_string(),
        };
        message.push_str(&format!("• **{}**\n  {}\n\n", event.title(), when));
    }

    ctx.say(message).await?;

    Ok(())
}

/// Resolve the Google Calendar handle, preferring the running component's
/// one and falling back to a standalone handle
async fn calendar_handle(ctx: &Context<'_>) -> GoogleCalendarHandle {
    let config = ctx.data().config.clone();

    if let Some(cm) = &ctx.data().component_manager {
        if let Some(component) = cm.get_component_by_name("google_calendar") {
            if let Some(calendar_component) = component
                .as_any()
                .downcast_ref::<crate::components::google_calendar::GoogleCalendar>()
            {
                if let Some(handle) = calendar_component.get_handle().await {
                    tracing::debug!("Using Google Calendar handle from ComponentManager");
                    return handle;
                }
            }
        }
    }

    tracing::debug!("Google Calendar component not available, creating standalone handle");
    GoogleCalendarHandle::new(config)
}

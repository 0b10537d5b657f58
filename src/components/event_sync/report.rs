use serenity::all::ScheduledEventId;

/// Outcome of syncing a single calendar event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A scheduled event was created on the chat platform
    Created { id: ScheduledEventId },
    /// The event was deliberately not published (e.g. its start had passed)
    Skipped { reason: String },
    /// Mapping or publishing failed for this event
    Failed { reason: String },
}

/// One per-event result entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub title: String,
    pub outcome: SyncOutcome,
}

/// Ordered per-event outcomes of one sync invocation
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
    /// Set when the batch was cut short by cancellation
    pub cancelled: bool,
}

impl SyncReport {
    pub fn push_created(&mut self, title: String, id: ScheduledEventId) {
        self.entries.push(SyncEntry {
            title,
            outcome: SyncOutcome::Created { id },
        });
    }

    pub fn push_skipped(&mut self, title: String, reason: String) {
        self.entries.push(SyncEntry {
            title,
            outcome: SyncOutcome::Skipped { reason },
        });
    }

    pub fn push_failed(&mut self, title: String, reason: String) {
        self.entries.push(SyncEntry {
            title,
            outcome: SyncOutcome::Failed { reason },
        });
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Failed { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    /// Human-readable summary for the invoking channel, naming each failed
    /// event and its reason
    pub fn summary(&self) -> String {
        let mut message = format!("✅ Created {} event(s)", self.created());

        if self.skipped() > 0 {
            message.push_str(&format!("\n⏭️ Skipped {} event(s)", self.skipped()));
        }

        if self.failed() > 0 {
            message.push_str(&format!("\n⚠️ Failed {} event(s):", self.failed()));
            for entry in &self.entries {
                if let SyncOutcome::Failed { reason } = &entry.outcome {
                    message.push_str(&format!("\n• **{}**: {}", entry.title, reason));
                }
            }
        }

        if self.cancelled {
            message.push_str("\nSync was cancelled before the batch completed.");
        }

        message
    }
}

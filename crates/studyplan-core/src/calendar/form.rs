//! Create/edit/delete flow for events outside the grid gestures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::{normalize_reminders, reminder_keys, Category, Event, Reminder};
use crate::error::ValidationError;
use crate::time::ClockTime;

pub const DEFAULT_TITLE: &str = "Nuovo impegno";

/// Form contents for a new or edited event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// `None` creates a new event.
    pub id: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    pub time_start: ClockTime,
    /// `None` applies [`auto_end_time`].
    pub time_end: Option<ClockTime>,
    pub category: Category,
    pub notes: String,
    pub reminders: Vec<Reminder>,
}

impl EventDraft {
    pub fn new(date: NaiveDate, time_start: ClockTime) -> Self {
        Self {
            id: None,
            title: DEFAULT_TITLE.to_string(),
            date,
            time_start,
            time_end: None,
            category: Category::default(),
            notes: String::new(),
            reminders: Vec::new(),
        }
    }

    /// Draft for a day picked without a time of day: 09:00 to 10:00.
    pub fn for_day(date: NaiveDate) -> Self {
        let mut draft = Self::new(date, ClockTime::saturating_from_minutes(9 * 60));
        draft.time_end = Some(ClockTime::saturating_from_minutes(10 * 60));
        draft
    }

    /// Pre-fill a draft from an existing event for editing.
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: Some(event.id.clone()),
            title: event.title.clone(),
            date: event.date,
            time_start: event.time_start,
            time_end: Some(event.time_end),
            category: event.category,
            notes: event.notes.clone(),
            reminders: event.reminders.clone(),
        }
    }

    pub fn resolved_end(&self) -> ClockTime {
        self.time_end.unwrap_or_else(|| auto_end_time(self.time_start))
    }
}

/// End time suggested when the start changes: one hour later, hour capped
/// at 23.
pub fn auto_end_time(start: ClockTime) -> ClockTime {
    let hour = (start.hour() + 1).min(23);
    ClockTime::hm(hour, start.minute()).unwrap_or(start)
}

/// Apply a submitted form. Returns the id of the created or updated event.
///
/// Editing keeps `completed`, and keeps `remindersSent` only when neither the
/// date nor the reminder rule set changed.
pub fn upsert_event(events: &mut Vec<Event>, draft: EventDraft) -> Result<String, ValidationError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "title".into(),
            message: "must not be empty".into(),
        });
    }
    let time_end = draft.resolved_end();
    if time_end <= draft.time_start {
        return Err(ValidationError::InvalidTimeRange {
            start: draft.time_start.to_string(),
            end: time_end.to_string(),
        });
    }
    let reminders = normalize_reminders(draft.reminders);

    match draft.id {
        Some(id) => {
            let existing = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| ValidationError::NotFound {
                    kind: "event",
                    id: id.clone(),
                })?;
            let keep_sent = existing.date == draft.date
                && existing.reminder_keys() == reminder_keys(&reminders);
            existing.title = title;
            existing.date = draft.date;
            existing.time_start = draft.time_start;
            existing.time_end = time_end;
            existing.category = draft.category;
            existing.notes = draft.notes;
            existing.reminders = reminders;
            if !keep_sent {
                existing.reset_reminders_sent();
            }
            tracing::debug!(event = %id, keep_sent, "event updated");
            Ok(id)
        }
        None => {
            let id = crate::ids::new_id();
            events.push(Event {
                id: id.clone(),
                title,
                date: draft.date,
                time_start: draft.time_start,
                time_end,
                category: draft.category,
                notes: draft.notes,
                completed: false,
                reminders,
                reminders_sent: Vec::new(),
            });
            tracing::debug!(event = %id, "event created");
            Ok(id)
        }
    }
}

/// Flip the completion flag. Returns the new value, or `None` if unknown.
pub fn toggle_completed(events: &mut [Event], id: &str) -> Option<bool> {
    let event = events.iter_mut().find(|e| e.id == id)?;
    event.completed = !event.completed;
    Some(event.completed)
}

/// Remove an event. Returns whether anything was removed.
pub fn delete_event(events: &mut Vec<Event>, id: &str) -> bool {
    let before = events.len();
    events.retain(|e| e.id != id);
    events.len() != before
}

//! Results emitted by the grid gesture engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{Event, EventDraft};
use crate::time::ClockTime;

/// Which edge of an event a resize handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

/// A mutation already applied to the event collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridMutation {
    Moved {
        id: String,
        date: NaiveDate,
        time_start: ClockTime,
        time_end: ClockTime,
        date_changed: bool,
    },
    Duplicated {
        source_id: String,
        event: Event,
    },
    Resized {
        id: String,
        edge: Edge,
        time_start: ClockTime,
        time_end: ClockTime,
    },
}

impl GridMutation {
    /// Id of the event that now carries the new geometry.
    pub fn event_id(&self) -> &str {
        match self {
            GridMutation::Moved { id, .. } | GridMutation::Resized { id, .. } => id,
            GridMutation::Duplicated { event, .. } => &event.id,
        }
    }
}

/// Why a finished gesture left the collection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The resolved duration was zero or negative.
    DegenerateDuration,
    /// The event disappeared while the gesture was running.
    EventMissing,
}

/// What the host should do after feeding an input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridOutcome {
    /// Show the creation form pre-filled with `draft`.
    OpenCreate { draft: EventDraft },
    /// Show the edit form for an existing event.
    OpenEdit { id: String },
    /// Long press elapsed; a ghost copy now follows the pointer.
    DuplicateArmed { id: String },
    /// The event collection changed; persist and re-render.
    Committed { mutation: GridMutation },
    Discarded { id: String, reason: DiscardReason },
    /// The gesture ended without crossing the movement threshold.
    Cancelled { id: String },
}

impl GridOutcome {
    pub fn mutation(&self) -> Option<&GridMutation> {
        match self {
            GridOutcome::Committed { mutation } => Some(mutation),
            _ => None,
        }
    }
}

/// Live geometry of the element being dragged or resized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub id: String,
    pub column: usize,
    pub top_px: f64,
    pub height_px: f64,
    /// `"HH:MM - HH:MM"` snapped times under the preview.
    pub label: String,
    /// True while the preview is a ghost copy rather than the event itself.
    pub ghost: bool,
}

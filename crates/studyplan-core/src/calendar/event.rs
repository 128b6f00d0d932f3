//! Calendar event model.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::time::ClockTime;

/// Fixed event categories, each with a display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Lezione,
    Studio,
    Esame,
    Progetto,
    Personale,
    Pausa,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Lezione,
        Category::Studio,
        Category::Esame,
        Category::Progetto,
        Category::Personale,
        Category::Pausa,
    ];

    pub fn color(self) -> &'static str {
        match self {
            Category::Lezione => "#60a5fa",
            Category::Studio => "#8070d0",
            Category::Esame => "#f87171",
            Category::Progetto => "#34d399",
            Category::Personale => "#fbbf24",
            Category::Pausa => "#2dd4bf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Lezione => "Lezione",
            Category::Studio => "Studio",
            Category::Esame => "Esame",
            Category::Progetto => "Progetto",
            Category::Personale => "Personale",
            Category::Pausa => "Pausa",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Category::Lezione => "lezione",
            Category::Studio => "studio",
            Category::Esame => "esame",
            Category::Progetto => "progetto",
            Category::Personale => "personale",
            Category::Pausa => "pausa",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "category".into(),
                message: format!("unknown category '{s}'"),
            })
    }
}

/// When a reminder fires relative to the event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderKind {
    #[serde(rename = "day-before")]
    DayBefore,
    #[serde(rename = "same-day")]
    SameDay,
}

impl ReminderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "day-before",
            ReminderKind::SameDay => "same-day",
        }
    }

    /// Fallback time shown when the rule is switched on in a form.
    pub fn default_time(self) -> ClockTime {
        match self {
            ReminderKind::DayBefore => ClockTime::saturating_from_minutes(20 * 60),
            ReminderKind::SameDay => ClockTime::saturating_from_minutes(7 * 60),
        }
    }
}

/// A single reminder rule. An event carries at most one rule per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub time: ClockTime,
}

impl Reminder {
    pub fn new(kind: ReminderKind, time: ClockTime) -> Self {
        Self { kind, time }
    }

    /// Identifier recorded in `remindersSent` once the scheduler fires it,
    /// e.g. `same-day:07:00`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.time)
    }
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub date: NaiveDate,
    pub time_start: ClockTime,
    pub time_end: ClockTime,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "deserialize_reminders")]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub reminders_sent: Vec<String>,
}

impl Event {
    pub fn duration_minutes(&self) -> i32 {
        self.time_end.minutes() - self.time_start.minutes()
    }

    pub fn reminder(&self, kind: ReminderKind) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.kind == kind)
    }

    /// Sorted `kind:time` keys of the reminder rule set.
    pub fn reminder_keys(&self) -> Vec<String> {
        reminder_keys(&self.reminders)
    }

    /// Forget which reminders already fired.
    pub fn reset_reminders_sent(&mut self) {
        self.reminders_sent.clear();
    }
}

pub(crate) fn reminder_keys(reminders: &[Reminder]) -> Vec<String> {
    let mut keys: Vec<String> = reminders.iter().map(Reminder::key).collect();
    keys.sort();
    keys
}

/// Keep one rule per kind, last one wins.
pub(crate) fn normalize_reminders(reminders: Vec<Reminder>) -> Vec<Reminder> {
    let mut out: Vec<Reminder> = Vec::with_capacity(2);
    for r in reminders {
        match out.iter_mut().find(|o| o.kind == r.kind) {
            Some(slot) => *slot = r,
            None => out.push(r),
        }
    }
    out.sort_by_key(|r| r.kind);
    out
}

/// Accepts both the list form and the older object form
/// `{"dayBefore": {"enabled": true, "time": "20:00"}, "sameDay": {...}}`.
fn deserialize_reminders<'de, D>(deserializer: D) -> Result<Vec<Reminder>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Toggle {
        #[serde(default)]
        enabled: bool,
        time: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Legacy {
        day_before: Option<Toggle>,
        same_day: Option<Toggle>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        List(Vec<Reminder>),
        Legacy(Legacy),
    }

    let shape: Option<Shape> = Option::deserialize(deserializer)?;
    let reminders = match shape {
        None => Vec::new(),
        Some(Shape::List(list)) => list,
        Some(Shape::Legacy(legacy)) => {
            let mut list = Vec::new();
            for (kind, toggle) in [
                (ReminderKind::DayBefore, legacy.day_before),
                (ReminderKind::SameDay, legacy.same_day),
            ] {
                if let Some(t) = toggle.filter(|t| t.enabled) {
                    let time = t.time.and_then(|s| s.parse().ok());
                    list.push(Reminder::new(kind, time.unwrap_or(kind.default_time())));
                }
            }
            list
        }
    };
    Ok(normalize_reminders(reminders))
}

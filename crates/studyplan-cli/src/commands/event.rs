//! Calendar event commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use studyplan_core::calendar::{
    delete_event, events_between, events_on, find_event, toggle_completed, upsert_event,
};
use studyplan_core::{Category, ClockTime, EventDraft, Reminder, ReminderKind, ValidationError};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum EventAction {
    /// Create an event
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(long)]
        start: ClockTime,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Edit an event; omitted fields keep their value
    Edit {
        /// Event ID
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        start: Option<ClockTime>,
        #[command(flatten)]
        fields: EventFields,
        /// Drop every reminder rule
        #[arg(long, conflicts_with = "remind")]
        no_reminders: bool,
    },
    /// List events of a day, or of a date range
    List {
        /// Single day
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Show one event
    Show {
        /// Event ID
        id: String,
    },
    /// Toggle the completed flag
    Done {
        /// Event ID
        id: String,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
    /// List categories with their colours
    Categories,
}

#[derive(Args)]
pub struct EventFields {
    /// End time (HH:MM); one hour after start when omitted on create
    #[arg(long)]
    end: Option<ClockTime>,
    #[arg(long)]
    title: Option<String>,
    /// lezione, studio, esame, progetto, personale or pausa
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    notes: Option<String>,
    /// Reminder rule: day-before[=HH:MM] or same-day[=HH:MM] (repeatable)
    #[arg(long, value_parser = parse_reminder)]
    remind: Vec<Reminder>,
}

impl EventFields {
    fn apply(self, draft: &mut EventDraft) {
        if let Some(end) = self.end {
            draft.time_end = Some(end);
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(notes) = self.notes {
            draft.notes = notes;
        }
        if !self.remind.is_empty() {
            draft.reminders = self.remind;
        }
    }
}

fn parse_reminder(s: &str) -> Result<Reminder, String> {
    let (kind, time) = match s.split_once('=') {
        Some((kind, time)) => (kind, Some(time)),
        None => (s, None),
    };
    let kind = match kind.trim() {
        "day-before" => ReminderKind::DayBefore,
        "same-day" => ReminderKind::SameDay,
        other => return Err(format!("unknown reminder '{other}', expected day-before or same-day")),
    };
    let time = match time {
        Some(t) => t.parse::<ClockTime>().map_err(|e| e.to_string())?,
        None => kind.default_time(),
    };
    Ok(Reminder::new(kind, time))
}

fn not_found(id: &str) -> ValidationError {
    ValidationError::NotFound {
        kind: "event",
        id: id.to_string(),
    }
}

pub fn run(action: EventAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        EventAction::Add {
            date,
            start,
            fields,
        } => {
            let mut draft = EventDraft::new(date, start);
            fields.apply(&mut draft);
            let id = ctx
                .planner
                .update_events(|events| upsert_event(events, draft))?
                .value;
            println!("Event created: {id}");
            if let Some(event) = find_event(ctx.planner.events(), &id) {
                print_json(event)?;
            }
        }
        EventAction::Edit {
            id,
            date,
            start,
            fields,
            no_reminders,
        } => {
            let existing = find_event(ctx.planner.events(), &id).ok_or_else(|| not_found(&id))?;
            let mut draft = EventDraft::from_event(existing);
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(start) = start {
                draft.time_start = start;
                // A new start without a new end keeps the form's auto end.
                if fields.end.is_none() {
                    draft.time_end = None;
                }
            }
            fields.apply(&mut draft);
            if no_reminders {
                draft.reminders.clear();
            }
            ctx.planner
                .update_events(|events| upsert_event(events, draft))?;
            if let Some(event) = find_event(ctx.planner.events(), &id) {
                print_json(event)?;
            }
        }
        EventAction::List { date, from, to } => {
            let events = ctx.planner.events();
            let list = match (date, from, to) {
                (Some(day), _, _) => events_on(events, day),
                (None, Some(from), Some(to)) => events_between(events, from, to),
                _ => {
                    let mut all: Vec<_> = events.iter().collect();
                    all.sort_by_key(|e| (e.date, e.time_start));
                    all
                }
            };
            print_json(&list)?;
        }
        EventAction::Show { id } => {
            let event = find_event(ctx.planner.events(), &id).ok_or_else(|| not_found(&id))?;
            print_json(event)?;
        }
        EventAction::Done { id } => {
            let completed = ctx
                .planner
                .update_events(|events| toggle_completed(events, &id).ok_or_else(|| not_found(&id)))?
                .value;
            println!("{}", if completed { "completed" } else { "not completed" });
        }
        EventAction::Delete { id } => {
            ctx.planner.update_events(|events| {
                if delete_event(events, &id) {
                    Ok(())
                } else {
                    Err(not_found(&id))
                }
            })?;
            println!("Event deleted: {id}");
        }
        EventAction::Categories => {
            let list: Vec<_> = Category::ALL
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "category": c,
                        "label": c.label(),
                        "color": c.color(),
                    })
                })
                .collect();
            print_json(&list)?;
        }
    }
    Ok(())
}

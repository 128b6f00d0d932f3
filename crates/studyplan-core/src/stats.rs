//! Dashboard statistics and the read-only queries the desktop widget uses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{events_between, events_on, Event};
use crate::career::{upcoming_exams, Career, Exam};
use crate::time::{week_dates, week_start};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub total: usize,
    pub completed: usize,
    /// `completed / total`, 0 on an empty day.
    pub ratio: f64,
}

impl DayStats {
    fn count<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let (total, completed) = events
            .into_iter()
            .fold((0, 0), |(t, c), e| (t + 1, c + usize::from(e.completed)));
        let ratio = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };
        Self {
            total,
            completed,
            ratio,
        }
    }
}

/// Numbers for the stats panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub today: DayStats,
    /// From this week's Monday through today.
    pub week_to_date: DayStats,
    pub upcoming_exams: usize,
}

pub fn overview(events: &[Event], career: Option<&Career>, today: NaiveDate) -> Overview {
    Overview {
        today: DayStats::count(events_on(events, today)),
        week_to_date: DayStats::count(events_between(events, week_start(today), today)),
        upcoming_exams: career
            .map(|c| upcoming_exams(c, today, usize::MAX).len())
            .unwrap_or(0),
    }
}

/// Completed events, newest first, at most `limit`.
pub fn history(events: &[Event], limit: usize) -> Vec<&Event> {
    let mut done: Vec<&Event> = events.iter().filter(|e| e.completed).collect();
    done.sort_by(|a, b| (b.date, b.time_end).cmp(&(a.date, a.time_end)));
    done.truncate(limit);
    done
}

// ── Widget queries ──────────────────────────────────────────────

pub fn widget_today(events: &[Event], today: NaiveDate) -> Vec<&Event> {
    events_on(events, today)
}

/// This week's events ordered by date and start.
pub fn widget_week(events: &[Event], today: NaiveDate) -> Vec<&Event> {
    let Some(days) = week_dates(today, 0) else {
        return Vec::new();
    };
    events_between(events, days[0], days[6])
}

/// Pending exams by exam date, undated ones last.
pub fn widget_pending_exams(career: Option<&Career>) -> Vec<&Exam> {
    let Some(career) = career else {
        return Vec::new();
    };
    let mut pending: Vec<&Exam> = career.exams.iter().filter(|e| !e.is_passed()).collect();
    pending.sort_by_key(|e| (e.exam_date.is_none(), e.exam_date));
    pending
}

//! Calendar events: model, form flow and day/week queries.

mod event;
mod form;

pub use event::{Category, Event, Reminder, ReminderKind};
pub use form::{auto_end_time, delete_event, toggle_completed, upsert_event, EventDraft, DEFAULT_TITLE};

use chrono::NaiveDate;

use crate::time::MonthCell;

/// Events on `date`, sorted by start time.
pub fn events_on(events: &[Event], date: NaiveDate) -> Vec<&Event> {
    let mut day: Vec<&Event> = events.iter().filter(|e| e.date == date).collect();
    day.sort_by_key(|e| e.time_start);
    day
}

/// Events within `first..=last`, sorted by date then start time.
pub fn events_between(events: &[Event], first: NaiveDate, last: NaiveDate) -> Vec<&Event> {
    let mut range: Vec<&Event> = events
        .iter()
        .filter(|e| e.date >= first && e.date <= last)
        .collect();
    range.sort_by_key(|e| (e.date, e.time_start));
    range
}

/// Events of each month-grid cell, in cell order, each day sorted by start.
pub fn month_agenda<'a>(events: &'a [Event], cells: &[MonthCell]) -> Vec<Vec<&'a Event>> {
    cells.iter().map(|cell| events_on(events, cell.date)).collect()
}

/// Create-flow draft for a clicked month cell; padding days are inert.
pub fn month_day_draft(cell: &MonthCell) -> Option<EventDraft> {
    cell.in_month.then(|| EventDraft::for_day(cell.date))
}

pub fn find_event<'a>(events: &'a [Event], id: &str) -> Option<&'a Event> {
    events.iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ClockTime;

    fn ev(id: &str, day: u32, start: &str) -> Event {
        let start: ClockTime = start.parse().unwrap();
        Event {
            id: id.into(),
            title: id.into(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time_start: start,
            time_end: start.add_minutes(60),
            category: Category::Studio,
            notes: String::new(),
            completed: false,
            reminders: Vec::new(),
            reminders_sent: Vec::new(),
        }
    }

    #[test]
    fn day_query_sorts_by_start() {
        let events = vec![ev("b", 4, "11:00"), ev("a", 4, "08:00"), ev("c", 5, "07:00")];
        let day = events_on(&events, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        let ids: Vec<_> = day.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn range_query_is_inclusive_and_ordered() {
        let events = vec![
            ev("late", 10, "09:00"),
            ev("out", 11, "09:00"),
            ev("first", 4, "10:00"),
            ev("early", 4, "08:00"),
        ];
        let week = events_between(
            &events,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        );
        let ids: Vec<_> = week.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "late"]);
        assert!(find_event(&events, "out").is_some());
        assert!(find_event(&events, "gone").is_none());
    }

    #[test]
    fn month_agenda_groups_by_cell() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let cells = crate::time::month_cells(march, 0).unwrap();
        let events = vec![ev("b", 4, "11:00"), ev("a", 4, "08:00"), ev("c", 31, "07:00")];
        let agenda = month_agenda(&events, &cells);
        assert_eq!(agenda.len(), cells.len());
        // March 4th is the first Monday, cell 7; March 31st is cell 34.
        let ids: Vec<_> = agenda[7].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(agenda[34][0].id, "c");
        assert_eq!(agenda.iter().map(Vec::len).sum::<usize>(), 3);
    }

    #[test]
    fn month_click_opens_create_only_inside_the_month() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let cells = crate::time::month_cells(march, 0).unwrap();
        assert!(month_day_draft(&cells[0]).is_none());
        assert!(month_day_draft(&cells[41]).is_none());

        let draft = month_day_draft(&cells[4]).unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(draft.time_start, ClockTime::hm(9, 0).unwrap());
        assert_eq!(draft.time_end, Some(ClockTime::hm(10, 0).unwrap()));
        assert_eq!(draft.title, DEFAULT_TITLE);
        assert!(draft.id.is_none());
    }
}

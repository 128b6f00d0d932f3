//! Time-of-day and calendar-week helpers.
//!
//! Events store their times as `"HH:MM"` strings on disk; in memory they are
//! [`ClockTime`] values counted in minutes since midnight.

use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution, `00:00..=24:00`.
///
/// `24:00` is accepted so a grid that closes at midnight can express its
/// closing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Build from minutes since midnight. Out-of-range values are rejected.
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        if (0..=MINUTES_PER_DAY as i32).contains(&minutes) {
            Some(Self(minutes as u16))
        } else {
            None
        }
    }

    /// Build from minutes since midnight, clamping into `00:00..=24:00`.
    pub fn saturating_from_minutes(minutes: i32) -> Self {
        Self(minutes.clamp(0, MINUTES_PER_DAY as i32) as u16)
    }

    pub fn hm(hour: u8, minute: u8) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour as i32 * 60 + minute as i32)
    }

    pub fn minutes(self) -> i32 {
        self.0 as i32
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Shift by `delta` minutes, clamping at the day bounds.
    pub fn add_minutes(self, delta: i32) -> Self {
        Self::saturating_from_minutes(self.minutes() + delta)
    }
}

/// Format a minute count as `HH:MM` (`floor(total/60)` : `total mod 60`).
///
/// Negative totals are clamped to `00:00`.
pub fn minutes_to_time_of_day(total: i32) -> String {
    let total = total.max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time_of_day(self.minutes()))
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        ClockTime::hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

/// The seven dates, Monday through Sunday, of the week `offset` weeks away
/// from the week containing `today`, or `None` past the calendar's range.
pub fn week_dates(today: NaiveDate, offset: i64) -> Option<[NaiveDate; 7]> {
    let monday = today
        .checked_sub_days(Days::new(today.weekday().num_days_from_monday().into()))?
        .checked_add_signed(Duration::try_weeks(offset)?)?;
    monday.checked_add_days(Days::new(6))?;
    Some(std::array::from_fn(|i| monday + Days::new(i as u64)))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Cells in the month view: six Monday-first weeks.
pub const MONTH_GRID_CELLS: usize = 42;

/// One day of the month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCell {
    pub date: NaiveDate,
    /// False for padding days borrowed from the neighbouring months.
    pub in_month: bool,
}

/// Grid of the month `offset` months away from the month containing `today`.
///
/// The first row starts on the Monday on or before the 1st; leading and
/// trailing cells are filled from the previous and next month. `None` when
/// the grid would leave the calendar's range.
pub fn month_cells(today: NaiveDate, offset: i64) -> Option<[MonthCell; MONTH_GRID_CELLS]> {
    let index = i64::from(today.year())
        .checked_mul(12)?
        .checked_add(i64::from(today.month0()))?
        .checked_add(offset)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let start =
        first.checked_sub_days(Days::new(first.weekday().num_days_from_monday().into()))?;
    start.checked_add_days(Days::new(MONTH_GRID_CELLS as u64 - 1))?;
    Some(std::array::from_fn(|i| {
        let date = start + Days::new(i as u64);
        MonthCell {
            date,
            in_month: date.year() == year && date.month() == month,
        }
    }))
}

/// Whole days from `today` until `date` (negative when in the past).
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let t: ClockTime = "09:05".parse().unwrap();
        assert_eq!(t.minutes(), 545);
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 5);
    }

    #[test]
    fn rejects_malformed_times() {
        assert!("9".parse::<ClockTime>().is_err());
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("10:60".parse::<ClockTime>().is_err());
        assert!("ab:cd".parse::<ClockTime>().is_err());
    }

    #[test]
    fn accepts_midnight_closing_edge() {
        let t: ClockTime = "24:00".parse().unwrap();
        assert_eq!(t.minutes(), 1440);
        assert!("24:01".parse::<ClockTime>().is_err());
    }

    #[test]
    fn serde_uses_hh_mm_strings() {
        let t = ClockTime::hm(7, 30).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:30\"");
        let back: ClockTime = serde_json::from_str("\"21:00\"").unwrap();
        assert_eq!(back, ClockTime::hm(21, 0).unwrap());
        assert!(serde_json::from_str::<ClockTime>("\"nope\"").is_err());
    }

    #[test]
    fn minutes_formatting() {
        assert_eq!(minutes_to_time_of_day(0), "00:00");
        assert_eq!(minutes_to_time_of_day(845), "14:05");
        assert_eq!(minutes_to_time_of_day(-20), "00:00");
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-06 is a Wednesday.
        let wed = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let days = week_dates(wed, 0).unwrap();
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        let next = week_dates(wed, 1).unwrap();
        assert_eq!(next[0], NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());

        // Sunday belongs to the week that started six days earlier.
        let sun = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(week_start(sun), days[0]);
    }

    #[test]
    fn countdown_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let exam = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
        assert_eq!(days_until(today, exam), 7);
        assert_eq!(days_until(exam, today), -7);
    }

    #[test]
    fn week_offset_out_of_range_is_none() {
        let mon = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(week_dates(mon, 20_000_000), None);
        assert_eq!(week_dates(mon, -20_000_000), None);
        assert_eq!(week_dates(mon, i64::MAX), None);
        assert!(week_dates(mon, -52).is_some());
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_grid_pads_from_neighbouring_months() {
        // March 2024 opens on a Friday.
        let cells = month_cells(day(2024, 3, 15), 0).unwrap();
        assert_eq!(cells[0].date, day(2024, 2, 26));
        assert!(cells[..4].iter().all(|c| !c.in_month));
        assert_eq!(cells[4], MonthCell { date: day(2024, 3, 1), in_month: true });
        assert_eq!(cells[34], MonthCell { date: day(2024, 3, 31), in_month: true });
        assert_eq!(cells[35].date, day(2024, 4, 1));
        assert!(cells[35..].iter().all(|c| !c.in_month));
        assert_eq!(cells[41].date, day(2024, 4, 7));
        assert_eq!(cells.iter().filter(|c| c.in_month).count(), 31);
    }

    #[test]
    fn month_starting_on_monday_has_no_leading_padding() {
        let cells = month_cells(day(2024, 3, 31), 1).unwrap();
        assert_eq!(cells[0], MonthCell { date: day(2024, 4, 1), in_month: true });
        assert_eq!(cells[29].date, day(2024, 4, 30));
        assert!(!cells[30].in_month);
        assert_eq!(cells[41].date, day(2024, 5, 12));
    }

    #[test]
    fn month_offset_crosses_years() {
        let cells = month_cells(day(2024, 2, 29), -3).unwrap();
        // November 2023 opens on a Wednesday.
        assert_eq!(cells[0].date, day(2023, 10, 30));
        assert_eq!(cells[2], MonthCell { date: day(2023, 11, 1), in_month: true });

        let cells = month_cells(day(2024, 11, 20), 2).unwrap();
        assert!(cells.iter().any(|c| c.in_month && c.date == day(2025, 1, 31)));
    }

    #[test]
    fn month_offset_out_of_range_is_none() {
        let today = day(2024, 3, 6);
        assert!(month_cells(today, i64::MAX).is_none());
        assert!(month_cells(today, i64::MIN).is_none());
        assert!(month_cells(today, 10_000_000_000).is_none());
    }
}

//! Pixel/minute mapping for the week time-grid.
//!
//! All vertical coordinates are relative to the top of the grid body, where
//! `y = 0` is the grid's opening hour. Rounding follows half-up semantics so
//! that `x.5` always rounds toward positive infinity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::{minutes_to_time_of_day, ClockTime};

pub const SNAP_MINUTES: i32 = 15;

/// Round half up (`floor(x + 0.5)`).
fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// `round(minutes / increment) * increment`.
///
/// A non-positive increment disables snapping.
pub fn snap_to_grid(minutes: i32, increment: i32) -> i32 {
    if increment <= 0 {
        return minutes;
    }
    round_half_up(minutes as f64 / increment as f64) * increment
}

/// Vertical metrics of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub start_hour: u8,
    pub end_hour: u8,
    pub row_height_px: f64,
    pub snap_minutes: i32,
    /// Shortest duration an event is drawn with.
    pub min_visual_minutes: i32,
    pub default_duration_minutes: i32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            start_hour: 7,
            end_hour: 23,
            row_height_px: 60.0,
            snap_minutes: SNAP_MINUTES,
            min_visual_minutes: 15,
            default_duration_minutes: 60,
        }
    }
}

impl GridGeometry {
    pub fn px_per_minute(&self) -> f64 {
        self.row_height_px / 60.0
    }

    /// Minutes since midnight of the grid's opening edge.
    pub fn open_minutes(&self) -> i32 {
        self.start_hour as i32 * 60
    }

    /// Minutes since midnight of the grid's closing edge.
    pub fn close_minutes(&self) -> i32 {
        self.end_hour as i32 * 60
    }

    /// Total body height in pixels.
    pub fn body_height_px(&self) -> f64 {
        (self.close_minutes() - self.open_minutes()) as f64 * self.px_per_minute()
    }

    /// `round(px / (rowHeight/60)) + startHour*60`.
    pub fn pixel_to_minutes(&self, px: f64) -> i32 {
        let ppm = self.px_per_minute();
        if ppm <= 0.0 {
            return self.open_minutes();
        }
        round_half_up(px / ppm) + self.open_minutes()
    }

    /// `(minutes - startHour*60) * rowHeight/60`.
    pub fn minutes_to_pixel(&self, minutes: i32) -> f64 {
        (minutes - self.open_minutes()) as f64 * self.px_per_minute()
    }

    pub fn snap(&self, minutes: i32) -> i32 {
        snap_to_grid(minutes, self.snap_minutes)
    }

    /// Pixel position snapped to the grid, in minutes since midnight.
    pub fn snapped_minutes_at(&self, px: f64) -> i32 {
        self.snap(self.pixel_to_minutes(px))
    }

    pub fn min_visual_px(&self) -> f64 {
        self.min_visual_minutes as f64 * self.px_per_minute()
    }

    /// Drawn box of an event; the height never drops below the minimum
    /// visual duration, the stored times are left alone.
    pub fn event_box(&self, start: ClockTime, end: ClockTime) -> EventBox {
        let duration = (end.minutes() - start.minutes()).max(self.min_visual_minutes);
        EventBox {
            top_px: self.minutes_to_pixel(start.minutes()),
            height_px: duration as f64 * self.px_per_minute(),
        }
    }

    /// Start/end pre-filled when an empty cell is clicked at `y`: start is
    /// snapped and kept inside the grid, the default duration is cut at the
    /// closing hour.
    pub fn slot_at(&self, y: f64) -> (ClockTime, ClockTime) {
        let latest_start = (self.close_minutes() - self.snap_minutes.max(1)).max(self.open_minutes());
        let start = self
            .snapped_minutes_at(y)
            .clamp(self.open_minutes(), latest_start);
        let end = (start + self.default_duration_minutes).min(self.close_minutes());
        (
            ClockTime::saturating_from_minutes(start),
            ClockTime::saturating_from_minutes(end),
        )
    }

    /// Latest start that still lets `duration` fit before closing, and never
    /// earlier than opening.
    pub fn clamp_start(&self, start: i32, duration: i32) -> i32 {
        start
            .min(self.close_minutes() - duration)
            .max(self.open_minutes())
    }

    /// `"HH:MM - HH:MM"` label shown while dragging.
    pub fn label(&self, start: i32, end: i32) -> String {
        format!(
            "{} - {}",
            minutes_to_time_of_day(start),
            minutes_to_time_of_day(end)
        )
    }
}

/// Drawn position of an event inside its day column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBox {
    pub top_px: f64,
    pub height_px: f64,
}

impl EventBox {
    pub fn bottom_px(&self) -> f64 {
        self.top_px + self.height_px
    }
}

/// Horizontal extent of one day column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub left_px: f64,
    pub right_px: f64,
}

impl DayColumn {
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.left_px && x <= self.right_px
    }

    pub fn center_x(&self) -> f64 {
        (self.left_px + self.right_px) / 2.0
    }
}

/// The seven day columns of the visible week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekLayout {
    pub columns: Vec<DayColumn>,
}

impl WeekLayout {
    /// Equal-width columns starting at `left_px`.
    pub fn uniform(dates: &[NaiveDate], left_px: f64, column_width_px: f64) -> Self {
        let columns = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let left = left_px + i as f64 * column_width_px;
                DayColumn {
                    date,
                    left_px: left,
                    right_px: left + column_width_px,
                }
            })
            .collect();
        Self { columns }
    }

    /// Column under `x`. Where two columns share an edge the later one wins.
    pub fn column_at(&self, x: f64) -> Option<usize> {
        self.columns.iter().rposition(|c| c.contains_x(x))
    }

    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        self.columns.iter().position(|c| c.date == date)
    }

    pub fn date_of(&self, column: usize) -> Option<NaiveDate> {
        self.columns.get(column).map(|c| c.date)
    }
}

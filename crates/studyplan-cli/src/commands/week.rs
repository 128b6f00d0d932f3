use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use studyplan_core::calendar::events_on;
use studyplan_core::time::week_dates;
use studyplan_core::Event;

use super::{print_json, today, CmdResult, Context};

#[derive(Args)]
pub struct WeekArgs {
    /// Weeks away from the current one (negative for past weeks)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    offset: i64,
    /// Reference date instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
struct Placed<'a> {
    #[serde(flatten)]
    event: &'a Event,
    top_px: f64,
    height_px: f64,
    color: &'static str,
}

#[derive(Serialize)]
struct Column<'a> {
    date: NaiveDate,
    is_today: bool,
    events: Vec<Placed<'a>>,
}

pub fn run(args: WeekArgs) -> CmdResult {
    let ctx = Context::open()?;
    let today = today(args.today);
    let geometry = ctx.config.geometry();

    let columns: Vec<Column> = week_dates(today, args.offset)
        .ok_or("week offset out of range")?
        .into_iter()
        .map(|date| Column {
            date,
            is_today: date == today,
            events: events_on(ctx.planner.events(), date)
                .into_iter()
                .map(|event| {
                    let bbox = geometry.event_box(event.time_start, event.time_end);
                    Placed {
                        event,
                        top_px: bbox.top_px,
                        height_px: bbox.height_px,
                        color: event.category.color(),
                    }
                })
                .collect(),
        })
        .collect();
    print_json(&columns)
}

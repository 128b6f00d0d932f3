use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use studyplan_core::calendar::{month_agenda, month_day_draft};
use studyplan_core::time::{month_cells, MonthCell};
use studyplan_core::{Event, EventDraft};

use super::{print_json, today, CmdResult, Context};

#[derive(Args)]
pub struct MonthArgs {
    /// Months away from the current one (negative for past months)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    offset: i64,
    /// Reference date instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
struct Cell<'a> {
    #[serde(flatten)]
    cell: MonthCell,
    is_today: bool,
    events: Vec<&'a Event>,
    /// Form a click on this day would open.
    create: Option<EventDraft>,
}

pub fn run(args: MonthArgs) -> CmdResult {
    let ctx = Context::open()?;
    let today = today(args.today);
    let cells = month_cells(today, args.offset).ok_or("month offset out of range")?;

    let grid: Vec<Cell> = cells
        .iter()
        .zip(month_agenda(ctx.planner.events(), &cells))
        .map(|(cell, events)| Cell {
            cell: *cell,
            is_today: cell.date == today,
            events,
            create: month_day_draft(cell),
        })
        .collect();
    print_json(&grid)
}

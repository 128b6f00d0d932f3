//! Dashboard numbers and the lists the desktop widget shows.

use chrono::NaiveDate;
use clap::Subcommand;
use studyplan_core::stats::{history, overview, widget_pending_exams, widget_today, widget_week};

use super::{print_json, today, CmdResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's and this week's completion, plus upcoming exams
    Overview {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Completed events, most recent first
    History {
        /// Overrides career.history_limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Widget feeds
    Widget {
        #[command(subcommand)]
        feed: WidgetFeed,
    },
}

#[derive(Subcommand)]
pub enum WidgetFeed {
    /// Events of today
    Today {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Events of the current week
    Week {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Pending exams, dated ones first
    Exams,
}

pub fn run(action: StatsAction) -> CmdResult {
    let ctx = Context::open()?;
    let events = ctx.planner.events();

    match action {
        StatsAction::Overview { today: day } => {
            print_json(&overview(events, ctx.planner.career(), today(day)))?;
        }
        StatsAction::History { limit } => {
            let limit = limit.unwrap_or(ctx.config.career.history_limit);
            print_json(&history(events, limit))?;
        }
        StatsAction::Widget { feed } => match feed {
            WidgetFeed::Today { today: day } => print_json(&widget_today(events, today(day)))?,
            WidgetFeed::Week { today: day } => print_json(&widget_week(events, today(day)))?,
            WidgetFeed::Exams => print_json(&widget_pending_exams(ctx.planner.career()))?,
        },
    }
    Ok(())
}

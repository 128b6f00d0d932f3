//! Replays pointer input against the week grid.
//!
//! Input is a JSON list of pointer events, e.g.
//! `[{"input":"down","target":{"on":"event","id":"…"},"x":50,"y":130,"at_ms":0}, …]`.

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use studyplan_core::grid::{DragPreview, GesturePhase};
use studyplan_core::time::week_dates;
use studyplan_core::{GridEngine, GridOutcome, PointerInput, Views, WeekLayout};

use super::{print_json, today, CmdResult, Context};

#[derive(Subcommand)]
pub enum GridAction {
    /// Feed a recorded pointer sequence to the grid and apply the result
    Replay {
        /// JSON file with the inputs, `-` for stdin
        input: PathBuf,
        /// Weeks away from the current one
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset: i64,
        #[arg(long)]
        today: Option<NaiveDate>,
        /// X of the first day column's left edge
        #[arg(long, default_value = "0")]
        left: f64,
        /// Width of one day column
        #[arg(long, default_value = "100")]
        column_width: f64,
    },
    /// Time slot under a vertical grid position
    Slot {
        /// Pixels from the top of the grid body
        y: f64,
    },
}

#[derive(Serialize)]
struct Step {
    index: usize,
    phase: GesturePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<GridOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<DragPreview>,
}

#[derive(Serialize)]
struct Replay {
    steps: Vec<Step>,
    views: Views,
}

fn read_inputs(path: &Path) -> Result<Vec<PointerInput>, Box<dyn std::error::Error>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

pub fn run(action: GridAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        GridAction::Replay {
            input,
            offset,
            today: today_arg,
            left,
            column_width,
        } => {
            let inputs = read_inputs(&input)?;
            let dates =
                week_dates(today(today_arg), offset).ok_or("week offset out of range")?;
            let layout = WeekLayout::uniform(&dates, left, column_width);
            let mut engine = GridEngine::new(ctx.config.geometry(), layout)
                .with_gestures(ctx.config.gestures);

            let mut views = Views::NONE;
            let mut steps = Vec::with_capacity(inputs.len());
            for (index, input) in inputs.into_iter().enumerate() {
                let (outcome, dirty) = ctx.planner.pointer(&mut engine, input)?;
                views = views | dirty;
                steps.push(Step {
                    index,
                    phase: engine.phase(),
                    outcome,
                    preview: engine.preview(),
                });
            }
            if let Some(outcome) = engine.cancel() {
                tracing::warn!(?outcome, "input ended mid-gesture");
            }
            print_json(&Replay { steps, views })?;
        }
        GridAction::Slot { y } => {
            let geometry = ctx.config.geometry();
            let (start, end) = geometry.slot_at(y);
            print_json(&serde_json::json!({
                "timeStart": start,
                "timeEnd": end,
                "label": geometry.label(start.minutes(), end.minutes()),
            }))?;
        }
    }
    Ok(())
}

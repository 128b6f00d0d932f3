use clap::Subcommand;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show notification settings
    Show,
    /// Change one setting (e.g. `morningTime 08:00`, `eveningNotif false`)
    Set { key: String, value: String },
}

pub fn run(action: SettingsAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        SettingsAction::Show => print_json(ctx.planner.settings())?,
        SettingsAction::Set { key, value } => {
            ctx.planner
                .update_settings(|settings| settings.set(&key, &value))?;
            print_json(ctx.planner.settings())?;
        }
    }
    Ok(())
}

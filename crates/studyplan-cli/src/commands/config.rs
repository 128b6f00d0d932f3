use clap::Subcommand;
use studyplan_core::storage::data_dir;
use studyplan_core::Config;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "grid.snap_minutes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    let dir = data_dir()?;

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_from(&dir)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(&dir)?;
            config.set(&key, &value)?;
            config.save_to(&dir)?;
            println!("ok");
        }
        ConfigAction::List => {
            print_json(&Config::load_from(&dir)?)?;
        }
        ConfigAction::Reset => {
            Config::default().save_to(&dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

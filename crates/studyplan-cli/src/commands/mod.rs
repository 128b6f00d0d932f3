pub mod career;
pub mod config;
pub mod event;
pub mod exam;
pub mod file;
pub mod grid;
pub mod month;
pub mod settings;
pub mod stats;
pub mod week;

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use studyplan_core::storage::data_dir;
use studyplan_core::{Config, JsonStore, LocalAttachments, Planner};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs from the data directory.
pub struct Context {
    pub dir: PathBuf,
    pub config: Config,
    pub planner: Planner,
}

impl Context {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = data_dir()?;
        let config = Config::load_or_default(&dir);
        let planner = Planner::load(JsonStore::new(&dir));
        Ok(Self {
            dir,
            config,
            planner,
        })
    }

    pub fn attachments(&self) -> LocalAttachments {
        LocalAttachments::in_data_dir(&self.dir)
    }
}

/// `--today` override, local date otherwise.
pub fn today(arg: Option<NaiveDate>) -> NaiveDate {
    arg.unwrap_or_else(|| chrono::Local::now().date_naive())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

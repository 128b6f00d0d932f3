mod config;
mod json_store;
mod settings;
mod snapshot;

pub use config::{CareerConfig, Config, GridConfig};
pub use json_store::{JsonStore, Persistence};
pub use settings::Settings;
pub use snapshot::{Collection, Revision, SnapshotGate};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `STUDYPLAN_DATA_DIR` wins when set. Otherwise `~/.config/studyplan`, or
/// `~/.config/studyplan-dev` with `STUDYPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STUDYPLAN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyplan-dev")
            } else {
                base_dir.join("studyplan")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

//! TOML-based application configuration.
//!
//! Stores:
//! - Week grid geometry (visible hours, row height, snapping)
//! - Gesture thresholds (drag distance, long-press delay)
//! - Career view limits
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::grid::{GestureConfig, GridGeometry};

const FILE_NAME: &str = "config.toml";

/// Week grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,
    #[serde(default = "default_end_hour")]
    pub end_hour: u8,
    #[serde(default = "default_row_height")]
    pub row_height_px: f64,
    #[serde(default = "default_15")]
    pub snap_minutes: i32,
    #[serde(default = "default_15")]
    pub min_visual_minutes: i32,
    #[serde(default = "default_60")]
    pub default_duration_minutes: i32,
}

/// Career view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerConfig {
    /// How many upcoming exams the dashboard lists.
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    /// How many completed events the history keeps.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub career: CareerConfig,
}

// Default functions
fn default_start_hour() -> u8 {
    7
}
fn default_end_hour() -> u8 {
    23
}
fn default_row_height() -> f64 {
    60.0
}
fn default_15() -> i32 {
    15
}
fn default_60() -> i32 {
    60
}
fn default_upcoming_limit() -> usize {
    5
}
fn default_history_limit() -> usize {
    20
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            row_height_px: default_row_height(),
            snap_minutes: default_15(),
            min_visual_minutes: default_15(),
            default_duration_minutes: default_60(),
        }
    }
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self {
            upcoming_limit: default_upcoming_limit(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<i64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(FILE_NAME)
    }

    /// Load from `dir`, writing defaults back when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(dir)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path_in(dir);
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_err(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning defaults on error.
    pub fn load_or_default(dir: &Path) -> Self {
        Self::load_from(dir).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the field's type.
    /// The result must still validate; nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first field that breaks the grid's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };
        let g = &self.grid;
        if g.end_hour > 24 {
            return invalid("grid.end_hour", format!("{} is past midnight", g.end_hour));
        }
        if g.start_hour >= g.end_hour {
            return invalid(
                "grid.start_hour",
                format!("must be before end_hour ({})", g.end_hour),
            );
        }
        if !(g.row_height_px > 0.0) {
            return invalid("grid.row_height_px", "must be positive".into());
        }
        if g.snap_minutes <= 0 {
            return invalid("grid.snap_minutes", "must be positive".into());
        }
        if g.min_visual_minutes < 0 {
            return invalid("grid.min_visual_minutes", "must not be negative".into());
        }
        if g.default_duration_minutes <= 0 {
            return invalid("grid.default_duration_minutes", "must be positive".into());
        }
        if !(self.gestures.drag_threshold_px >= 0.0) {
            return invalid("gestures.drag_threshold_px", "must not be negative".into());
        }
        Ok(())
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry {
            start_hour: self.grid.start_hour,
            end_hour: self.grid.end_hour,
            row_height_px: self.grid.row_height_px,
            snap_minutes: self.grid.snap_minutes,
            min_visual_minutes: self.grid.min_visual_minutes,
            default_duration_minutes: self.grid.default_duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.geometry(), GridGeometry::default());
        assert_eq!(parsed.gestures, GestureConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[grid]\nstart_hour = 8\n").unwrap();
        assert_eq!(parsed.grid.start_hour, 8);
        assert_eq!(parsed.grid.end_hour, 23);
        assert_eq!(parsed.career.history_limit, 20);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("grid.start_hour").as_deref(), Some("7"));
        assert_eq!(cfg.get("gestures.long_press_ms").as_deref(), Some("500"));
        assert_eq!(cfg.get("grid.row_height_px").as_deref(), Some("60.0"));
        assert!(cfg.get("grid").is_none());
        assert!(cfg.get("grid.missing_key").is_none());
    }

    #[test]
    fn set_keeps_field_types() {
        let mut cfg = Config::default();
        cfg.set("grid.row_height_px", "48").unwrap();
        assert_eq!(cfg.grid.row_height_px, 48.0);
        cfg.set("career.upcoming_limit", "3").unwrap();
        assert_eq!(cfg.career.upcoming_limit, 3);
        assert!(matches!(
            cfg.set("career.upcoming_limit", "many"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut cfg = Config::default();
        for key in ["", "grid", "grid.nonexistent", "ui.dark_mode"] {
            assert!(
                matches!(cfg.set(key, "1"), Err(ConfigError::UnknownKey(_))),
                "{key}"
            );
        }
    }

    #[test]
    fn set_rejects_invalid_grid() {
        let mut cfg = Config::default();
        assert!(cfg.set("grid.start_hour", "23").is_err());
        assert!(cfg.set("grid.end_hour", "25").is_err());
        assert!(cfg.set("grid.snap_minutes", "0").is_err());
        assert!(cfg.set("grid.row_height_px", "-1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(Config::path_in(dir.path()).exists());

        let mut changed = cfg.clone();
        changed.set("grid.end_hour", "21").unwrap();
        changed.save_to(dir.path()).unwrap();
        assert_eq!(Config::load_from(dir.path()).unwrap().grid.end_hour, 21);
    }

    #[test]
    fn broken_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path_in(dir.path()), "[grid\nstart_hour=").unwrap();
        assert!(matches!(
            Config::load_from(dir.path()),
            Err(ConfigError::LoadFailed { .. })
        ));
        assert_eq!(Config::load_or_default(dir.path()), Config::default());
    }
}

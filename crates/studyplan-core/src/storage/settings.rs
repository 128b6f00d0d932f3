//! Notification preferences, persisted as `settings.json`.
//!
//! The core only stores these; the reminder scheduler that reads them lives
//! outside the library.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::ClockTime;

/// Daily digest toggles and their times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub morning_notif: bool,
    pub afternoon_notif: bool,
    pub evening_notif: bool,
    pub morning_time: ClockTime,
    pub afternoon_time: ClockTime,
    pub evening_time: ClockTime,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            morning_notif: true,
            afternoon_notif: true,
            evening_notif: true,
            morning_time: ClockTime::saturating_from_minutes(7 * 60 + 30),
            afternoon_time: ClockTime::saturating_from_minutes(14 * 60),
            evening_time: ClockTime::saturating_from_minutes(21 * 60),
        }
    }
}

impl Settings {
    /// Apply `value` to a field named as in `settings.json`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let flag = |v: &str| {
            v.parse::<bool>().map_err(|_| ValidationError::InvalidValue {
                field: key.to_string(),
                message: format!("expected true or false, got '{v}'"),
            })
        };
        match key {
            "morningNotif" => self.morning_notif = flag(value)?,
            "afternoonNotif" => self.afternoon_notif = flag(value)?,
            "eveningNotif" => self.evening_notif = flag(value)?,
            "morningTime" => self.morning_time = value.parse()?,
            "afternoonTime" => self.afternoon_time = value.parse()?,
            "eveningTime" => self.evening_time = value.parse()?,
            other => {
                return Err(ValidationError::InvalidValue {
                    field: other.to_string(),
                    message: "unknown setting".into(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_file_format() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["morningTime"], "07:30");
        assert_eq!(json["afternoonTime"], "14:00");
        assert_eq!(json["eveningTime"], "21:00");
        assert_eq!(json["eveningNotif"], true);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Settings = serde_json::from_str(r#"{"morningNotif":false}"#).unwrap();
        assert!(!s.morning_notif);
        assert!(s.afternoon_notif);
        assert_eq!(s.evening_time.to_string(), "21:00");
    }

    #[test]
    fn set_by_file_key() {
        let mut s = Settings::default();
        s.set("eveningTime", "22:15").unwrap();
        s.set("afternoonNotif", "false").unwrap();
        assert_eq!(s.evening_time, ClockTime::hm(22, 15).unwrap());
        assert!(!s.afternoon_notif);
        assert!(s.set("eveningTime", "25:00").is_err());
        assert!(s.set("nightNotif", "true").is_err());
    }
}

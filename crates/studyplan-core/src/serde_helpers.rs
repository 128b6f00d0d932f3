//! Serde helpers for the on-disk JSON encodings.
//!
//! Older data files store "no date" as an empty string and grades as bare
//! integers; these modules keep those files loadable.

/// `Option<NaiveDate>` encoded as `"YYYY-MM-DD"`, with `""` and `null` both
/// decoding to `None`. `None` is written back as `""`.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Non-negative counters that older files sometimes stored as `null`.
pub mod lenient_u32 {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<i64> = Option::deserialize(deserializer)?;
        Ok(raw.unwrap_or(0).clamp(0, u32::MAX as i64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(with = "super::optional_date", default)]
        date: Option<NaiveDate>,
        #[serde(deserialize_with = "super::lenient_u32::deserialize", default)]
        count: u32,
    }

    #[test]
    fn empty_string_is_none() {
        let w: Wrapper = serde_json::from_str(r#"{"date": "", "count": 3}"#).unwrap();
        assert_eq!(w.date, None);
        assert_eq!(w.count, 3);
    }

    #[test]
    fn null_and_missing_are_none() {
        let w: Wrapper = serde_json::from_str(r#"{"date": null, "count": null}"#).unwrap();
        assert_eq!(w, Wrapper { date: None, count: 0 });
        let w: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(w, Wrapper { date: None, count: 0 });
    }

    #[test]
    fn dates_round_trip_as_iso() {
        let w = Wrapper {
            date: NaiveDate::from_ymd_opt(2024, 6, 20),
            count: 0,
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"2024-06-20\""));
        let none = serde_json::to_string(&Wrapper { date: None, count: 0 }).unwrap();
        assert!(none.contains("\"date\":\"\""));
    }

    #[test]
    fn negative_counters_clamp_to_zero() {
        let w: Wrapper = serde_json::from_str(r#"{"count": -4}"#).unwrap();
        assert_eq!(w.count, 0);
    }
}

//! JSON files in the data directory, one per collection.
//!
//! Loads never fail: a missing or malformed file yields the empty default
//! and a warning. Saves replace the whole file (write to a temp file, then
//! rename) and go through a [`SnapshotGate`] so only the newest snapshot of
//! a collection is kept.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::settings::Settings;
use super::snapshot::{Collection, Revision, SnapshotGate};
use crate::calendar::Event;
use crate::career::Career;
use crate::error::StorageError;

/// Load/save contract between the host state and disk. Saves replace the
/// whole collection; `Ok(false)` means the snapshot was stale and dropped.
pub trait Persistence {
    /// Stamp a new in-memory commit.
    fn next_revision(&self) -> Revision;

    fn load_events(&self) -> Vec<Event>;
    fn save_events(&self, events: &[Event], revision: Revision) -> Result<bool, StorageError>;

    fn load_career(&self) -> Option<Career>;
    fn save_career(&self, career: Option<&Career>, revision: Revision)
        -> Result<bool, StorageError>;

    fn load_settings(&self) -> Settings;
    fn save_settings(&self, settings: &Settings, revision: Revision)
        -> Result<bool, StorageError>;
}

#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    gate: SnapshotGate,
}

impl JsonStore {
    /// Store rooted at `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            gate: SnapshotGate::new(),
        }
    }

    /// Store in the default data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(super::data_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    fn read_value(&self, collection: Collection) -> Option<serde_json::Value> {
        let path = self.path(collection);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable file, using default");
                return None;
            }
        };
        if text.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed JSON, using default");
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(collection: Collection, value: serde_json::Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(%collection, error = %e, "unexpected shape, using default");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        collection: Collection,
        value: &T,
        revision: Revision,
    ) -> Result<bool, StorageError> {
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|source| StorageError::EncodeFailed {
                collection: collection.as_str(),
                source,
            })?;
        let path = self.path(collection);
        let written = self.gate.write_if_newer(collection, revision, || {
            write_atomic(&path, &bytes).map_err(|source| StorageError::WriteFailed {
                path: path.clone(),
                source,
            })
        })?;
        if written {
            tracing::info!(%collection, revision = revision.0, bytes = bytes.len(), "snapshot saved");
        }
        Ok(written)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

impl Persistence for JsonStore {
    fn next_revision(&self) -> Revision {
        self.gate.issue()
    }

    /// Entries that fail to decode are skipped one by one.
    fn load_events(&self) -> Vec<Event> {
        let Some(value) = self.read_value(Collection::Events) else {
            return Vec::new();
        };
        let serde_json::Value::Array(items) = value else {
            tracing::warn!("events file is not a list, using default");
            return Vec::new();
        };
        items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value::<Event>(item) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "skipping malformed event");
                    None
                }
            })
            .collect()
    }

    fn save_events(&self, events: &[Event], revision: Revision) -> Result<bool, StorageError> {
        self.write(Collection::Events, events, revision)
    }

    /// `null` and `{}` both mean "no career".
    fn load_career(&self) -> Option<Career> {
        let value = self.read_value(Collection::Career)?;
        match &value {
            serde_json::Value::Null => return None,
            serde_json::Value::Object(map) if map.is_empty() => return None,
            _ => {}
        }
        let mut career: Career = Self::decode(Collection::Career, value)?;
        career.normalize();
        Some(career)
    }

    fn save_career(
        &self,
        career: Option<&Career>,
        revision: Revision,
    ) -> Result<bool, StorageError> {
        self.write(Collection::Career, &career, revision)
    }

    fn load_settings(&self) -> Settings {
        self.read_value(Collection::Settings)
            .and_then(|v| Self::decode(Collection::Settings, v))
            .unwrap_or_default()
    }

    fn save_settings(&self, settings: &Settings, revision: Revision) -> Result<bool, StorageError> {
        self.write(Collection::Settings, settings, revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::career::ProgramType;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_files_load_defaults() {
        let (_dir, store) = store();
        assert!(store.load_events().is_empty());
        assert!(store.load_career().is_none());
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn malformed_files_load_defaults() {
        let (_dir, store) = store();
        std::fs::write(store.path(Collection::Events), "[{").unwrap();
        std::fs::write(store.path(Collection::Career), "{}").unwrap();
        std::fs::write(store.path(Collection::Settings), "42").unwrap();
        assert!(store.load_events().is_empty());
        assert!(store.load_career().is_none());
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn bad_event_entries_are_skipped() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(Collection::Events),
            r#"[{"id":"a","title":"A","date":"2024-03-04","timeStart":"09:00","timeEnd":"10:00"},
               {"id":"b","date":"not a date"}]"#,
        )
        .unwrap();
        let events = store.load_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "a");
    }

    #[test]
    fn career_round_trip_and_reset() {
        let (_dir, store) = store();
        let career = Career::new("Uni", "Corso", ProgramType::CicloUnico5);
        assert!(store.save_career(Some(&career), store.next_revision()).unwrap());
        let loaded = store.load_career().unwrap();
        assert_eq!(loaded, career);

        assert!(store.save_career(None, store.next_revision()).unwrap());
        assert_eq!(
            std::fs::read_to_string(store.path(Collection::Career)).unwrap(),
            "null"
        );
        assert!(store.load_career().is_none());
    }

    #[test]
    fn legacy_career_gets_derived_fields() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(Collection::Career),
            r#"{"university":"Uni","course":"Corso","type":"magistrale","exams":[]}"#,
        )
        .unwrap();
        let career = store.load_career().unwrap();
        assert_eq!(career.total_cfu, 120);
        assert_eq!(career.university_name, "Uni");
    }

    #[test]
    fn stale_snapshot_does_not_overwrite_newer() {
        let (_dir, store) = store();
        let old = store.next_revision();
        let new = store.next_revision();
        let mut late = Settings::default();
        late.morning_notif = false;

        assert!(store.save_settings(&late, new).unwrap());
        assert!(!store.save_settings(&Settings::default(), old).unwrap());
        assert!(!store.load_settings().morning_notif);
        assert!(!store.path(Collection::Settings).with_extension("json.tmp").exists());
    }
}

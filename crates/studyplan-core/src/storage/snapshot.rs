//! Last-write-wins bookkeeping for whole-collection snapshots.
//!
//! Each mutation is stamped with a [`Revision`] when it is committed in
//! memory. A snapshot reaches disk only if its revision is newer than the
//! last one written for that collection; older snapshots are dropped, never
//! merged. The check and the write happen under one lock, so a slow write
//! of an old snapshot cannot land after a newer one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::StorageError;

/// Persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Events,
    Career,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Events, Collection::Career, Collection::Settings];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Events => "events.json",
            Collection::Career => "career.json",
            Collection::Settings => "settings.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Career => "career",
            Collection::Settings => "settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic stamp of an in-memory commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

#[derive(Debug, Default)]
pub struct SnapshotGate {
    next: AtomicU64,
    written: Mutex<HashMap<Collection, Revision>>,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new commit. Revisions start at 1.
    pub fn issue(&self) -> Revision {
        Revision(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Last revision written for `collection`.
    pub fn written(&self, collection: Collection) -> Option<Revision> {
        self.written
            .lock()
            .ok()
            .and_then(|w| w.get(&collection).copied())
    }

    /// Run `write` if `revision` is newer than the last written one.
    /// Returns `false` when the snapshot was stale and skipped. A failed
    /// write does not advance the collection's revision.
    pub fn write_if_newer<F>(
        &self,
        collection: Collection,
        revision: Revision,
        write: F,
    ) -> Result<bool, StorageError>
    where
        F: FnOnce() -> Result<(), StorageError>,
    {
        let mut written = self.written.lock().map_err(|_| StorageError::Poisoned)?;
        if written.get(&collection).is_some_and(|last| *last >= revision) {
            tracing::debug!(%collection, revision = revision.0, "dropping stale snapshot");
            return Ok(false);
        }
        write()?;
        written.insert(collection, revision);
        Ok(true)
    }
}

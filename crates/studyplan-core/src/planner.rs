//! Host-side state: the in-memory collections and their persistence.
//!
//! The engines never hold state of their own; `Planner` passes the
//! collections into them, and after each committed change stamps a revision,
//! saves the whole collection and reports which views went stale.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::calendar::Event;
use crate::career::Career;
use crate::error::CoreError;
use crate::grid::{GridEngine, GridOutcome, PointerInput};
use crate::storage::{JsonStore, Persistence, Revision, Settings};

/// Views to re-render after a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Views {
    pub today: bool,
    pub week: bool,
    pub stats: bool,
    pub career: bool,
}

impl Views {
    pub const NONE: Views = Views {
        today: false,
        week: false,
        stats: false,
        career: false,
    };
    /// Everything that lists events.
    pub const EVENTS: Views = Views {
        today: true,
        week: true,
        stats: true,
        career: false,
    };
    /// Career page plus the upcoming-exam count in stats.
    pub const CAREER: Views = Views {
        today: false,
        week: false,
        stats: true,
        career: true,
    };
    pub const ALL: Views = Views {
        today: true,
        week: true,
        stats: true,
        career: true,
    };

    pub fn any(self) -> bool {
        self != Views::NONE
    }
}

impl BitOr for Views {
    type Output = Views;

    fn bitor(self, rhs: Views) -> Views {
        Views {
            today: self.today || rhs.today,
            week: self.week || rhs.week,
            stats: self.stats || rhs.stats,
            career: self.career || rhs.career,
        }
    }
}

/// Result of a committed edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit<T> {
    pub value: T,
    pub revision: Revision,
    /// `false` when a newer snapshot had already been written.
    pub persisted: bool,
    pub views: Views,
}

pub struct Planner<P: Persistence = JsonStore> {
    store: P,
    events: Vec<Event>,
    career: Option<Career>,
    settings: Settings,
}

impl<P: Persistence> Planner<P> {
    /// Load every collection from `store`.
    pub fn load(store: P) -> Self {
        let mut planner = Self {
            store,
            events: Vec::new(),
            career: None,
            settings: Settings::default(),
        };
        planner.reload();
        planner
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn career(&self) -> Option<&Career> {
        self.career.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Another process changed the files: drop memory, read everything back.
    pub fn reload(&mut self) -> Views {
        self.events = self.store.load_events();
        self.career = self.store.load_career();
        self.settings = self.store.load_settings();
        tracing::debug!(
            events = self.events.len(),
            career = self.career.is_some(),
            "planner reloaded"
        );
        Views::ALL
    }

    /// Run `edit` on the event list and persist it if the edit succeeds.
    pub fn update_events<T, E>(
        &mut self,
        edit: impl FnOnce(&mut Vec<Event>) -> Result<T, E>,
    ) -> Result<Commit<T>, CoreError>
    where
        E: Into<CoreError>,
    {
        let value = edit(&mut self.events).map_err(Into::into)?;
        let revision = self.store.next_revision();
        let persisted = self.store.save_events(&self.events, revision)?;
        Ok(Commit {
            value,
            revision,
            persisted,
            views: Views::EVENTS,
        })
    }

    /// Run `edit` on the career plan (which may be absent) and persist it.
    pub fn update_career<T, E>(
        &mut self,
        edit: impl FnOnce(&mut Option<Career>) -> Result<T, E>,
    ) -> Result<Commit<T>, CoreError>
    where
        E: Into<CoreError>,
    {
        let value = edit(&mut self.career).map_err(Into::into)?;
        let revision = self.store.next_revision();
        let persisted = self.store.save_career(self.career.as_ref(), revision)?;
        Ok(Commit {
            value,
            revision,
            persisted,
            views: Views::CAREER,
        })
    }

    pub fn update_settings<T, E>(
        &mut self,
        edit: impl FnOnce(&mut Settings) -> Result<T, E>,
    ) -> Result<Commit<T>, CoreError>
    where
        E: Into<CoreError>,
    {
        let value = edit(&mut self.settings).map_err(Into::into)?;
        let revision = self.store.next_revision();
        let persisted = self.store.save_settings(&self.settings, revision)?;
        Ok(Commit {
            value,
            revision,
            persisted,
            views: Views::NONE,
        })
    }

    /// Feed one pointer input to the grid engine. Outcomes that change an
    /// event are persisted; the rest only come back to the caller.
    pub fn pointer(
        &mut self,
        engine: &mut GridEngine,
        input: PointerInput,
    ) -> Result<(Option<GridOutcome>, Views), CoreError> {
        let outcome = engine.handle(input, &mut self.events);
        let Some(mutation) = outcome.as_ref().and_then(GridOutcome::mutation) else {
            return Ok((outcome, Views::NONE));
        };
        let revision = self.store.next_revision();
        self.store.save_events(&self.events, revision)?;
        tracing::debug!(event = mutation.event_id(), revision = revision.0, "grid edit saved");
        Ok((outcome, Views::EVENTS))
    }
}

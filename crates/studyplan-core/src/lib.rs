//! # StudyPlan Core Library
//!
//! Business logic for the StudyPlan study planner: calendar events, the
//! weekly time grid, and a university career tracker with per-file study
//! progress. Every operation is reachable from the `studyplan` CLI; a GUI
//! host would sit on the same library.
//!
//! ## Architecture
//!
//! - **Time grid**: a pure state machine that turns pointer input over a
//!   7-column week into event creates, moves, resizes and duplicates
//! - **Progress**: weighted preparation score per exam from page counters
//!   and exercise checklists
//! - **Storage**: one JSON file per collection with last-write-wins
//!   snapshots, TOML configuration
//! - **Attachments**: study files copied into the data directory
//!
//! ## Key Components
//!
//! - [`GridEngine`]: gesture state machine over a [`GridGeometry`]
//! - [`calc_progress`]: exam preparation percentage
//! - [`Planner`]: host state owning the collections and their persistence
//! - [`Config`]: application configuration

pub mod attachments;
pub mod calendar;
pub mod career;
pub mod error;
pub mod grid;
pub mod ids;
pub mod planner;
mod serde_helpers;
pub mod stats;
pub mod storage;
pub mod time;

pub use attachments::{Attachments, LocalAttachments};
pub use calendar::{Category, Event, EventDraft, Reminder, ReminderKind};
pub use career::{calc_progress, Career, Exam, ExamDraft, ProgramType, StudyFile};
pub use error::{AttachmentError, ConfigError, CoreError, StorageError, ValidationError};
pub use grid::{GridEngine, GridGeometry, GridOutcome, PointerInput, WeekLayout};
pub use planner::{Commit, Planner, Views};
pub use storage::{Config, JsonStore, Persistence, Settings};
pub use time::ClockTime;

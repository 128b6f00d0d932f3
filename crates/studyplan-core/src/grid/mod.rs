//! Week time-grid: coordinate mapping and pointer gestures.
//!
//! [`geometry`] holds the pure pixel/minute conversions, [`GridEngine`]
//! turns pointer input into event mutations.

pub mod geometry;
mod gesture;
mod outcome;

pub use geometry::{snap_to_grid, DayColumn, EventBox, GridGeometry, WeekLayout, SNAP_MINUTES};
pub use gesture::{GestureConfig, GesturePhase, GridEngine, HitTarget, PointerInput};
pub use outcome::{DiscardReason, DragPreview, Edge, GridMutation, GridOutcome};

//! Pointer gesture state machine for the week grid.
//!
//! The engine has no timers or threads. The host forwards pointer input
//! together with a millisecond timestamp and calls [`GridEngine::handle`];
//! long-press detection happens on whichever input (`Tick`, `Move`, `Up`)
//! first observes the elapsed time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> PendingLongPress -> DraggingMove ---------> Idle
//!                          \-> DraggingDuplicate ----> Idle
//! Idle -> ResizingTop | ResizingBottom -------------> Idle
//! ```
//!
//! Only one gesture runs at a time; a `Down` while a gesture is active is
//! ignored.

use serde::{Deserialize, Serialize};

use super::geometry::{GridGeometry, WeekLayout};
use super::outcome::{DiscardReason, DragPreview, Edge, GridMutation, GridOutcome};
use crate::calendar::{Event, EventDraft};
use crate::ids::new_id;
use crate::time::ClockTime;

/// Thresholds that turn raw pointer motion into gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement (per axis) beyond which a press becomes a drag.
    pub drag_threshold_px: f64,
    /// Hold time that arms duplicate mode.
    pub long_press_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 3.0,
            long_press_ms: 500,
        }
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum HitTarget {
    /// Empty area of a day column.
    Cell { column: usize },
    /// Body of an event.
    Event { id: String },
    ResizeHandle { id: String, edge: Edge },
    /// Day header above a column.
    Header { column: usize },
}

/// Pointer input in grid-body coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum PointerInput {
    Down {
        target: HitTarget,
        x: f64,
        y: f64,
        at_ms: u64,
    },
    Move {
        x: f64,
        y: f64,
        at_ms: u64,
    },
    Up {
        x: f64,
        y: f64,
        at_ms: u64,
    },
    Click {
        target: HitTarget,
        x: f64,
        y: f64,
    },
    Tick {
        at_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Idle,
    PendingLongPress,
    DraggingMove,
    DraggingDuplicate,
    ResizingTop,
    ResizingBottom,
}

#[derive(Debug, Clone, PartialEq)]
struct DragState {
    id: String,
    origin_x: f64,
    origin_y: f64,
    pressed_at_ms: u64,
    origin_top_px: f64,
    height_px: f64,
    duration_min: i32,
    top_px: f64,
    column: usize,
    moved: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct ResizeState {
    id: String,
    origin_y: f64,
    origin_top_px: f64,
    origin_height_px: f64,
    start_min: i32,
    end_min: i32,
    column: usize,
    dy: f64,
    moved: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum GestureState {
    Idle,
    PendingLongPress(DragState),
    DraggingMove(DragState),
    DraggingDuplicate(DragState),
    Resizing(Edge, ResizeState),
}

/// Week-grid interaction engine.
///
/// Holds only gesture state; the event collection is passed into
/// [`handle`](Self::handle) by the owner.
#[derive(Debug, Clone)]
pub struct GridEngine {
    geometry: GridGeometry,
    gestures: GestureConfig,
    layout: WeekLayout,
    state: GestureState,
    /// One-shot guard swallowing the click that follows a drag release.
    just_dragged: Option<String>,
}

impl GridEngine {
    pub fn new(geometry: GridGeometry, layout: WeekLayout) -> Self {
        Self {
            geometry,
            gestures: GestureConfig::default(),
            layout,
            state: GestureState::Idle,
            just_dragged: None,
        }
    }

    pub fn with_gestures(mut self, gestures: GestureConfig) -> Self {
        self.gestures = gestures;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> &WeekLayout {
        &self.layout
    }

    pub fn phase(&self) -> GesturePhase {
        match &self.state {
            GestureState::Idle => GesturePhase::Idle,
            GestureState::PendingLongPress(_) => GesturePhase::PendingLongPress,
            GestureState::DraggingMove(_) => GesturePhase::DraggingMove,
            GestureState::DraggingDuplicate(_) => GesturePhase::DraggingDuplicate,
            GestureState::Resizing(Edge::Top, _) => GesturePhase::ResizingTop,
            GestureState::Resizing(Edge::Bottom, _) => GesturePhase::ResizingBottom,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Live geometry of the element under the pointer, if a gesture runs.
    pub fn preview(&self) -> Option<DragPreview> {
        let g = &self.geometry;
        match &self.state {
            GestureState::Idle => None,
            GestureState::PendingLongPress(d)
            | GestureState::DraggingMove(d)
            | GestureState::DraggingDuplicate(d) => {
                let start = g.snapped_minutes_at(d.top_px);
                Some(DragPreview {
                    id: d.id.clone(),
                    column: d.column,
                    top_px: d.top_px,
                    height_px: d.height_px,
                    label: g.label(start, start + d.duration_min),
                    ghost: matches!(self.state, GestureState::DraggingDuplicate(_)),
                })
            }
            GestureState::Resizing(edge, r) => {
                let (top, height) = r.live_box(*edge, g);
                Some(DragPreview {
                    id: r.id.clone(),
                    column: r.column,
                    top_px: top,
                    height_px: height,
                    label: g.label(g.snapped_minutes_at(top), g.snapped_minutes_at(top + height)),
                    ghost: false,
                })
            }
        }
    }

    /// Replace the visible week. Ignored while a gesture is running.
    pub fn set_layout(&mut self, layout: WeekLayout) {
        if self.is_active() {
            tracing::debug!("layout change ignored during gesture");
            return;
        }
        self.layout = layout;
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Feed one pointer input. Committed mutations are already applied to
    /// `events` when the outcome is returned.
    pub fn handle(&mut self, input: PointerInput, events: &mut Vec<Event>) -> Option<GridOutcome> {
        match input {
            PointerInput::Down { target, x, y, at_ms } => self.on_down(target, x, y, at_ms, events),
            PointerInput::Move { x, y, at_ms } => self.on_move(x, y, at_ms),
            PointerInput::Up { x, y, at_ms } => self.on_up(x, y, at_ms, events),
            PointerInput::Click { target, y, .. } => self.on_click(target, y, events),
            PointerInput::Tick { at_ms } => self.on_tick(at_ms),
        }
    }

    /// Abort the running gesture, leaving the collection untouched.
    pub fn cancel(&mut self) -> Option<GridOutcome> {
        let id = match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => return None,
            GestureState::PendingLongPress(d)
            | GestureState::DraggingMove(d)
            | GestureState::DraggingDuplicate(d) => d.id,
            GestureState::Resizing(_, r) => r.id,
        };
        Some(GridOutcome::Cancelled { id })
    }

    fn on_down(
        &mut self,
        target: HitTarget,
        x: f64,
        y: f64,
        at_ms: u64,
        events: &[Event],
    ) -> Option<GridOutcome> {
        if self.is_active() {
            return None;
        }
        let g = self.geometry;
        match target {
            HitTarget::Event { id } => {
                let event = events.iter().find(|e| e.id == id)?;
                let column = self.layout.column_of(event.date)?;
                let bbox = g.event_box(event.time_start, event.time_end);
                self.state = GestureState::PendingLongPress(DragState {
                    id,
                    origin_x: x,
                    origin_y: y,
                    pressed_at_ms: at_ms,
                    origin_top_px: bbox.top_px,
                    height_px: bbox.height_px,
                    duration_min: event.duration_minutes(),
                    top_px: bbox.top_px,
                    column,
                    moved: false,
                });
            }
            HitTarget::ResizeHandle { id, edge } => {
                let event = events.iter().find(|e| e.id == id)?;
                let column = self.layout.column_of(event.date)?;
                let bbox = g.event_box(event.time_start, event.time_end);
                self.state = GestureState::Resizing(
                    edge,
                    ResizeState {
                        id,
                        origin_y: y,
                        origin_top_px: bbox.top_px,
                        origin_height_px: bbox.height_px,
                        start_min: event.time_start.minutes(),
                        end_min: event.time_end.minutes(),
                        column,
                        dy: 0.0,
                        moved: false,
                    },
                );
            }
            HitTarget::Cell { .. } | HitTarget::Header { .. } => {}
        }
        None
    }

    fn on_tick(&mut self, at_ms: u64) -> Option<GridOutcome> {
        self.arm_duplicate_if_due(at_ms)
    }

    fn on_move(&mut self, x: f64, y: f64, at_ms: u64) -> Option<GridOutcome> {
        let armed = self.arm_duplicate_if_due(at_ms);
        let threshold = self.gestures.drag_threshold_px;
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        self.state = match state {
            GestureState::PendingLongPress(mut d) => {
                d.track(x, y, threshold, &self.layout);
                if d.moved {
                    tracing::trace!(event = %d.id, "drag started");
                    GestureState::DraggingMove(d)
                } else {
                    GestureState::PendingLongPress(d)
                }
            }
            GestureState::DraggingMove(mut d) => {
                d.track(x, y, threshold, &self.layout);
                GestureState::DraggingMove(d)
            }
            GestureState::DraggingDuplicate(mut d) => {
                d.track(x, y, threshold, &self.layout);
                GestureState::DraggingDuplicate(d)
            }
            GestureState::Resizing(edge, mut r) => {
                r.dy = y - r.origin_y;
                if r.dy.abs() > threshold {
                    r.moved = true;
                }
                GestureState::Resizing(edge, r)
            }
            GestureState::Idle => GestureState::Idle,
        };
        armed
    }

    fn on_up(&mut self, x: f64, y: f64, at_ms: u64, events: &mut Vec<Event>) -> Option<GridOutcome> {
        if !self.is_active() {
            return None;
        }
        // The release position counts as the final move.
        self.on_move(x, y, at_ms);
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle | GestureState::PendingLongPress(_) => None,
            GestureState::DraggingMove(d) => {
                self.just_dragged = Some(d.id.clone());
                Some(self.commit_move(d, events))
            }
            GestureState::DraggingDuplicate(d) => {
                if !d.moved {
                    return Some(GridOutcome::Cancelled { id: d.id });
                }
                self.just_dragged = Some(d.id.clone());
                Some(self.commit_duplicate(d, events))
            }
            GestureState::Resizing(edge, r) => {
                if !r.moved {
                    return Some(GridOutcome::Cancelled { id: r.id });
                }
                Some(self.commit_resize(edge, r, events))
            }
        }
    }

    fn on_click(&mut self, target: HitTarget, y: f64, events: &[Event]) -> Option<GridOutcome> {
        if self.is_active() {
            return None;
        }
        match target {
            HitTarget::Cell { column } => {
                let date = self.layout.date_of(column)?;
                let (start, end) = self.geometry.slot_at(y);
                let mut draft = EventDraft::new(date, start);
                draft.time_end = Some(end);
                Some(GridOutcome::OpenCreate { draft })
            }
            HitTarget::Header { column } => {
                let date = self.layout.date_of(column)?;
                Some(GridOutcome::OpenCreate {
                    draft: EventDraft::for_day(date),
                })
            }
            HitTarget::Event { id } => {
                if self.just_dragged.as_deref() == Some(id.as_str()) {
                    self.just_dragged = None;
                    return None;
                }
                events
                    .iter()
                    .any(|e| e.id == id)
                    .then_some(GridOutcome::OpenEdit { id })
            }
            HitTarget::ResizeHandle { .. } => None,
        }
    }

    fn arm_duplicate_if_due(&mut self, at_ms: u64) -> Option<GridOutcome> {
        let due = match &self.state {
            GestureState::PendingLongPress(d) => {
                at_ms.saturating_sub(d.pressed_at_ms) >= self.gestures.long_press_ms
            }
            _ => false,
        };
        if !due {
            return None;
        }
        let GestureState::PendingLongPress(d) = std::mem::replace(&mut self.state, GestureState::Idle) else {
            return None;
        };
        let id = d.id.clone();
        tracing::debug!(event = %id, "duplicate mode armed");
        self.state = GestureState::DraggingDuplicate(d);
        Some(GridOutcome::DuplicateArmed { id })
    }

    // ── Commit ───────────────────────────────────────────────────────

    /// Date and snapped start/end under the dragged element, or `None` when
    /// the duration is degenerate.
    fn resolve_drop(&self, d: &DragState) -> Option<(chrono::NaiveDate, ClockTime, ClockTime)> {
        if d.duration_min <= 0 {
            return None;
        }
        let date = self.layout.date_of(d.column)?;
        let g = &self.geometry;
        let start = g.clamp_start(g.snapped_minutes_at(d.top_px), d.duration_min);
        let end = start + d.duration_min;
        Some((
            date,
            ClockTime::from_minutes(start)?,
            ClockTime::from_minutes(end)?,
        ))
    }

    fn commit_move(&self, d: DragState, events: &mut [Event]) -> GridOutcome {
        let Some((date, time_start, time_end)) = self.resolve_drop(&d) else {
            return discarded(d.id, DiscardReason::DegenerateDuration);
        };
        let Some(event) = events.iter_mut().find(|e| e.id == d.id) else {
            return discarded(d.id, DiscardReason::EventMissing);
        };
        let date_changed = event.date != date;
        event.date = date;
        event.time_start = time_start;
        event.time_end = time_end;
        if date_changed {
            event.reset_reminders_sent();
        }
        tracing::debug!(event = %d.id, %date, start = %time_start, "event moved");
        GridOutcome::Committed {
            mutation: GridMutation::Moved {
                id: d.id,
                date,
                time_start,
                time_end,
                date_changed,
            },
        }
    }

    fn commit_duplicate(&self, d: DragState, events: &mut Vec<Event>) -> GridOutcome {
        let Some((date, time_start, time_end)) = self.resolve_drop(&d) else {
            return discarded(d.id, DiscardReason::DegenerateDuration);
        };
        let Some(source) = events.iter().find(|e| e.id == d.id) else {
            return discarded(d.id, DiscardReason::EventMissing);
        };
        let copy = Event {
            id: new_id(),
            title: source.title.clone(),
            date,
            time_start,
            time_end,
            category: source.category,
            notes: source.notes.clone(),
            completed: false,
            reminders: source.reminders.clone(),
            reminders_sent: Vec::new(),
        };
        events.push(copy.clone());
        tracing::debug!(source = %d.id, copy = %copy.id, "event duplicated");
        GridOutcome::Committed {
            mutation: GridMutation::Duplicated {
                source_id: d.id,
                event: copy,
            },
        }
    }

    fn commit_resize(&self, edge: Edge, r: ResizeState, events: &mut [Event]) -> GridOutcome {
        let g = &self.geometry;
        let (start, end) = match edge {
            Edge::Top => {
                let top = (r.origin_top_px + r.dy).max(0.0);
                (g.snapped_minutes_at(top).max(g.open_minutes()), r.end_min)
            }
            Edge::Bottom => {
                let bottom = g.minutes_to_pixel(r.end_min) + r.dy;
                (r.start_min, g.snapped_minutes_at(bottom).min(g.close_minutes()))
            }
        };
        if end <= start {
            return discarded(r.id, DiscardReason::DegenerateDuration);
        }
        // The stored duration never drops below the minimum; the moving edge
        // gives way, bounded by the grid.
        let min = g.min_visual_minutes.max(1);
        let (start, end) = match edge {
            Edge::Top => (start.min(end - min).max(g.open_minutes()), end),
            Edge::Bottom => (start, end.max(start + min).min(g.close_minutes())),
        };
        if end - start < min {
            return discarded(r.id, DiscardReason::DegenerateDuration);
        }
        let (Some(time_start), Some(time_end)) = (ClockTime::from_minutes(start), ClockTime::from_minutes(end)) else {
            return discarded(r.id, DiscardReason::DegenerateDuration);
        };
        let Some(event) = events.iter_mut().find(|e| e.id == r.id) else {
            return discarded(r.id, DiscardReason::EventMissing);
        };
        event.time_start = time_start;
        event.time_end = time_end;
        tracing::debug!(event = %r.id, ?edge, start = %time_start, end = %time_end, "event resized");
        GridOutcome::Committed {
            mutation: GridMutation::Resized {
                id: r.id,
                edge,
                time_start,
                time_end,
            },
        }
    }
}

fn discarded(id: String, reason: DiscardReason) -> GridOutcome {
    tracing::debug!(event = %id, ?reason, "gesture discarded");
    GridOutcome::Discarded { id, reason }
}

impl DragState {
    fn track(&mut self, x: f64, y: f64, threshold: f64, layout: &WeekLayout) {
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        if dx.abs() > threshold || dy.abs() > threshold {
            self.moved = true;
        }
        self.top_px = (self.origin_top_px + dy).max(0.0);
        if let Some(column) = layout.column_at(x) {
            self.column = column;
        }
    }
}

impl ResizeState {
    /// Drawn top/height while resizing; height never drops below the
    /// minimum visual duration and the opposite edge stays put.
    fn live_box(&self, edge: Edge, g: &GridGeometry) -> (f64, f64) {
        let min_h = g.min_visual_px();
        match edge {
            Edge::Top => {
                let top = (self.origin_top_px + self.dy).max(0.0);
                let height = (self.origin_height_px - self.dy).max(min_h);
                (top, height)
            }
            Edge::Bottom => (self.origin_top_px, (self.origin_height_px + self.dy).max(min_h)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Category, Reminder, ReminderKind};
    use chrono::NaiveDate;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    fn engine() -> GridEngine {
        let dates: Vec<_> = (4..=10).map(day).collect();
        GridEngine::new(
            GridGeometry::default(),
            WeekLayout::uniform(&dates, 0.0, 100.0),
        )
    }

    fn event(id: &str, date: NaiveDate, start: &str, end: &str) -> Event {
        Event {
            id: id.into(),
            title: "Analisi".into(),
            date,
            time_start: t(start),
            time_end: t(end),
            category: Category::Esame,
            notes: "aula 3".into(),
            completed: true,
            reminders: vec![Reminder::new(ReminderKind::SameDay, t("07:00"))],
            reminders_sent: vec!["same-day:07:00".into()],
        }
    }

    fn down(target: HitTarget, x: f64, y: f64, at_ms: u64) -> PointerInput {
        PointerInput::Down { target, x, y, at_ms }
    }

    fn on_event(id: &str) -> HitTarget {
        HitTarget::Event { id: id.into() }
    }

    #[test]
    fn press_without_motion_then_click_opens_edit() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        assert_eq!(grid.handle(down(on_event("e"), 50.0, 130.0, 0), &mut events), None);
        assert_eq!(grid.phase(), GesturePhase::PendingLongPress);
        grid.handle(PointerInput::Move { x: 52.0, y: 131.0, at_ms: 50 }, &mut events);
        assert_eq!(grid.phase(), GesturePhase::PendingLongPress);
        assert_eq!(
            grid.handle(PointerInput::Up { x: 52.0, y: 131.0, at_ms: 80 }, &mut events),
            None
        );
        let click = PointerInput::Click { target: on_event("e"), x: 52.0, y: 131.0 };
        assert_eq!(
            grid.handle(click, &mut events),
            Some(GridOutcome::OpenEdit { id: "e".into() })
        );
    }

    #[test]
    fn drag_moves_event_and_suppresses_following_click() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        grid.handle(down(on_event("e"), 50.0, 130.0, 0), &mut events);
        grid.handle(PointerInput::Move { x: 50.0, y: 200.0, at_ms: 100 }, &mut events);
        assert_eq!(grid.phase(), GesturePhase::DraggingMove);

        // +70px -> 10:10 snaps to 10:15.
        let out = grid
            .handle(PointerInput::Up { x: 50.0, y: 200.0, at_ms: 150 }, &mut events)
            .unwrap();
        let mutation = out.mutation().unwrap();
        assert!(matches!(
            mutation,
            GridMutation::Moved { date_changed: false, .. }
        ));
        assert_eq!(events[0].time_start, t("10:15"));
        assert_eq!(events[0].time_end, t("11:15"));
        assert_eq!(events[0].reminders_sent, vec!["same-day:07:00"]);

        let click = PointerInput::Click { target: on_event("e"), x: 50.0, y: 200.0 };
        assert_eq!(grid.handle(click.clone(), &mut events), None);
        assert_eq!(
            grid.handle(click, &mut events),
            Some(GridOutcome::OpenEdit { id: "e".into() })
        );
    }

    #[test]
    fn move_is_clamped_inside_grid() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "21:00", "22:30")];
        grid.handle(down(on_event("e"), 50.0, 850.0, 0), &mut events);
        grid.handle(PointerInput::Up { x: 50.0, y: 1200.0, at_ms: 10 }, &mut events);
        assert_eq!(events[0].time_start, t("21:30"));
        assert_eq!(events[0].time_end, t("23:00"));

        grid.handle(down(on_event("e"), 50.0, 900.0, 100), &mut events);
        grid.handle(PointerInput::Up { x: 50.0, y: -400.0, at_ms: 120 }, &mut events);
        assert_eq!(events[0].time_start, t("07:00"));
        assert_eq!(events[0].time_end, t("08:30"));
    }

    #[test]
    fn pointer_outside_columns_keeps_current_day() {
        let mut grid = engine();
        let mut events = vec![event("e", day(5), "09:00", "10:00")];
        grid.handle(down(on_event("e"), 150.0, 130.0, 0), &mut events);
        grid.handle(PointerInput::Move { x: 950.0, y: 190.0, at_ms: 20 }, &mut events);
        grid.handle(PointerInput::Up { x: 950.0, y: 190.0, at_ms: 30 }, &mut events);
        assert_eq!(events[0].date, day(5));
        assert_eq!(events[0].time_start, t("10:00"));
    }

    #[test]
    fn long_press_arms_duplicate_on_tick() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        grid.handle(down(on_event("e"), 50.0, 130.0, 1_000), &mut events);
        assert_eq!(grid.handle(PointerInput::Tick { at_ms: 1_499 }, &mut events), None);
        assert_eq!(
            grid.handle(PointerInput::Tick { at_ms: 1_500 }, &mut events),
            Some(GridOutcome::DuplicateArmed { id: "e".into() })
        );
        assert_eq!(grid.phase(), GesturePhase::DraggingDuplicate);
        assert!(grid.preview().unwrap().ghost);
    }

    #[test]
    fn duplicate_release_without_motion_is_cancelled() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        grid.handle(down(on_event("e"), 50.0, 130.0, 0), &mut events);
        grid.handle(PointerInput::Tick { at_ms: 600 }, &mut events);
        assert_eq!(
            grid.handle(PointerInput::Up { x: 51.0, y: 130.0, at_ms: 700 }, &mut events),
            Some(GridOutcome::Cancelled { id: "e".into() })
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn duplicate_copies_fields_with_fresh_state() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        let original = events[0].clone();
        grid.handle(down(on_event("e"), 50.0, 130.0, 0), &mut events);
        // Long press observed by the first move.
        let armed = grid.handle(PointerInput::Move { x: 150.0, y: 130.0, at_ms: 800 }, &mut events);
        assert_eq!(armed, Some(GridOutcome::DuplicateArmed { id: "e".into() }));
        let out = grid
            .handle(PointerInput::Up { x: 150.0, y: 130.0, at_ms: 900 }, &mut events)
            .unwrap();
        let GridMutation::Duplicated { source_id, event: copy } = out.mutation().unwrap().clone() else {
            panic!("expected duplicate");
        };
        assert_eq!(source_id, "e");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], original);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.date, day(5));
        assert_eq!(copy.title, original.title);
        assert_eq!(copy.notes, original.notes);
        assert_eq!(copy.category, original.category);
        assert_eq!(copy.reminders, original.reminders);
        assert!(!copy.completed);
        assert!(copy.reminders_sent.is_empty());
    }

    #[test]
    fn resize_top_moves_start_only() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Top };
        grid.handle(down(handle, 50.0, 120.0, 0), &mut events);
        grid.handle(PointerInput::Move { x: 50.0, y: 90.0, at_ms: 10 }, &mut events);
        assert_eq!(grid.phase(), GesturePhase::ResizingTop);
        assert_eq!(grid.preview().unwrap().label, "08:30 - 10:00");
        let out = grid.handle(PointerInput::Up { x: 50.0, y: 90.0, at_ms: 20 }, &mut events);
        assert!(matches!(
            out,
            Some(GridOutcome::Committed { mutation: GridMutation::Resized { edge: Edge::Top, .. } })
        ));
        assert_eq!(events[0].time_start, t("08:30"));
        assert_eq!(events[0].time_end, t("10:00"));
    }

    #[test]
    fn resize_bottom_is_capped_at_closing_hour() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "21:00", "22:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Bottom };
        grid.handle(down(handle, 50.0, 900.0, 0), &mut events);
        grid.handle(PointerInput::Up { x: 50.0, y: 1100.0, at_ms: 20 }, &mut events);
        assert_eq!(events[0].time_start, t("21:00"));
        assert_eq!(events[0].time_end, t("23:00"));
    }

    #[test]
    fn live_resize_keeps_minimum_height() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "10:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Bottom };
        grid.handle(down(handle, 50.0, 180.0, 0), &mut events);
        grid.handle(PointerInput::Move { x: 50.0, y: 60.0, at_ms: 10 }, &mut events);
        let preview = grid.preview().unwrap();
        assert_eq!(preview.top_px, 120.0);
        assert_eq!(preview.height_px, 15.0);
    }

    #[test]
    fn resize_without_motion_is_noop() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:05", "10:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Top };
        grid.handle(down(handle, 50.0, 125.0, 0), &mut events);
        assert_eq!(
            grid.handle(PointerInput::Up { x: 50.0, y: 126.0, at_ms: 5 }, &mut events),
            Some(GridOutcome::Cancelled { id: "e".into() })
        );
        assert_eq!(events[0].time_start, t("09:05"));
    }

    #[test]
    fn bottom_resize_keeps_minimum_duration_off_grid_start() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:05", "10:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Bottom };
        grid.handle(down(handle, 50.0, 180.0, 0), &mut events);
        grid.handle(PointerInput::Move { x: 50.0, y: 132.0, at_ms: 10 }, &mut events);
        let out = grid.handle(PointerInput::Up { x: 50.0, y: 132.0, at_ms: 20 }, &mut events);

        // 09:12 snaps to 09:15, ten minutes after the start; widened to 15.
        assert_eq!(
            out,
            Some(GridOutcome::Committed {
                mutation: GridMutation::Resized {
                    id: "e".into(),
                    edge: Edge::Bottom,
                    time_start: t("09:05"),
                    time_end: t("09:20"),
                },
            })
        );
        assert_eq!(events[0].duration_minutes(), 15);
    }

    #[test]
    fn top_resize_keeps_minimum_duration() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "09:00", "09:50")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Top };
        grid.handle(down(handle, 50.0, 120.0, 0), &mut events);
        // Top dragged to 09:45, five minutes before the end.
        grid.handle(PointerInput::Up { x: 50.0, y: 165.0, at_ms: 20 }, &mut events);

        assert_eq!(events[0].time_start, t("09:35"));
        assert_eq!(events[0].time_end, t("09:50"));
    }

    #[test]
    fn resize_with_no_room_for_minimum_is_discarded() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "22:50", "23:00")];
        let handle = HitTarget::ResizeHandle { id: "e".into(), edge: Edge::Bottom };
        grid.handle(down(handle, 50.0, 960.0, 0), &mut events);
        // 22:55 snaps to the 23:00 close, leaving ten minutes.
        let out = grid.handle(PointerInput::Up { x: 50.0, y: 955.0, at_ms: 20 }, &mut events);

        assert_eq!(
            out,
            Some(GridOutcome::Discarded {
                id: "e".into(),
                reason: DiscardReason::DegenerateDuration,
            })
        );
        assert_eq!(events[0].time_start, t("22:50"));
        assert_eq!(events[0].time_end, t("23:00"));
    }

    #[test]
    fn clicks_on_cells_headers_and_handles() {
        let mut grid = engine();
        let mut events = Vec::new();
        let out = grid.handle(
            PointerInput::Click { target: HitTarget::Cell { column: 2 }, x: 250.0, y: 427.0 },
            &mut events,
        );
        let Some(GridOutcome::OpenCreate { draft }) = out else {
            panic!("expected create");
        };
        assert_eq!(draft.date, day(6));
        assert_eq!(draft.time_start, t("14:00"));
        assert_eq!(draft.time_end, Some(t("15:00")));
        assert_eq!(draft.id, None);

        let out = grid.handle(
            PointerInput::Click { target: HitTarget::Header { column: 0 }, x: 50.0, y: 0.0 },
            &mut events,
        );
        let Some(GridOutcome::OpenCreate { draft }) = out else {
            panic!("expected create");
        };
        assert_eq!(draft.date, day(4));
        assert_eq!(draft.time_start, t("09:00"));

        let handle = HitTarget::ResizeHandle { id: "x".into(), edge: Edge::Top };
        assert_eq!(
            grid.handle(PointerInput::Click { target: handle, x: 0.0, y: 0.0 }, &mut events),
            None
        );
        assert_eq!(
            grid.handle(PointerInput::Click { target: on_event("gone"), x: 0.0, y: 0.0 }, &mut events),
            None
        );
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let mut grid = engine();
        let mut events = vec![
            event("a", day(4), "09:00", "10:00"),
            event("b", day(4), "12:00", "13:00"),
        ];
        grid.handle(down(on_event("a"), 50.0, 130.0, 0), &mut events);
        grid.handle(down(on_event("b"), 50.0, 310.0, 5), &mut events);
        assert_eq!(grid.preview().unwrap().id, "a");
        assert_eq!(grid.cancel(), Some(GridOutcome::Cancelled { id: "a".into() }));
        assert!(!grid.is_active());
        assert_eq!(grid.cancel(), None);
    }

    #[test]
    fn degenerate_stored_duration_is_discarded() {
        let mut grid = engine();
        let mut events = vec![event("e", day(4), "10:00", "10:00")];
        grid.handle(down(on_event("e"), 50.0, 180.0, 0), &mut events);
        let out = grid.handle(PointerInput::Up { x: 50.0, y: 260.0, at_ms: 10 }, &mut events);
        assert_eq!(
            out,
            Some(GridOutcome::Discarded {
                id: "e".into(),
                reason: DiscardReason::DegenerateDuration
            })
        );
        assert_eq!(events[0].time_start, t("10:00"));
    }
}

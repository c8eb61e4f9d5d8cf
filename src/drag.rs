//! Pointer gesture tracking for the handle.
//!
//! The tracker reports motion as deltas from the pointer position captured at
//! gesture start. Callers add the delta to the surface position they captured
//! at the same moment, so coalesced or repeated events cannot accumulate
//! rounding drift.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Started,
    Moved { dx: i32, dy: i32 },
    Ended { dx: i32, dy: i32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    origin: Option<(i32, i32)>,
    last_delta: (i32, i32),
    slop: u32,
    past_slop: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that ignores motion until the pointer leaves a `slop` radius
    /// (per axis) around the origin.
    pub fn with_slop(slop: u32) -> Self {
        Self {
            slop,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Begin a gesture at pointer `(x, y)`. A gesture already in progress is
    /// abandoned.
    pub fn begin(&mut self, x: i32, y: i32) -> DragEvent {
        self.origin = Some((x, y));
        self.last_delta = (0, 0);
        self.past_slop = self.slop == 0;
        DragEvent::Started
    }

    pub fn motion(&mut self, x: i32, y: i32) -> Option<DragEvent> {
        let (ox, oy) = self.origin?;
        let dx = x.saturating_sub(ox);
        let dy = y.saturating_sub(oy);
        if !self.past_slop {
            if dx.unsigned_abs() <= self.slop && dy.unsigned_abs() <= self.slop {
                return None;
            }
            self.past_slop = true;
        }
        self.last_delta = (dx, dy);
        Some(DragEvent::Moved { dx, dy })
    }

    /// Finish the gesture, reporting the last delta that was emitted.
    pub fn end(&mut self) -> Option<DragEvent> {
        self.origin.take()?;
        let (dx, dy) = std::mem::take(&mut self.last_delta);
        Some(DragEvent::Ended { dx, dy })
    }

    pub fn cancel(&mut self) {
        self.origin = None;
        self.last_delta = (0, 0);
    }

    /// Feed a terminal mouse event. Gestures only begin on a left-button press
    /// inside `grip`; motion and release are tracked anywhere once started.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, grip: Rect) -> Option<DragEvent> {
        let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if rect_contains(grip, mouse.column, mouse.row) {
                    Some(self.begin(x, y))
                } else {
                    None
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.motion(x, y),
            MouseEventKind::Up(MouseButton::Left) => self.end(),
            _ => None,
        }
    }
}

pub(crate) fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

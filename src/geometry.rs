//! Screen-space value types shared by the session, the animation runner and
//! surface hosts.
//!
//! Positions are plain `Copy` values. Every update computes a fresh position
//! and hands it to the host; nothing keeps a mutable layout object that drag
//! and animation code could both alias.

use std::fmt;

/// Integer position in device units (pixels on a phone, cells in a terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenPosition {
    pub x: i32,
    pub y: i32,
}

impl ScreenPosition {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position displaced by `(dx, dy)`, saturating at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Linear interpolation toward `to`; `t` is clamped to `0.0..=1.0` and
    /// `t == 1.0` always yields `to` exactly.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return to;
        }
        let step = |from: i32, to: i32| -> i32 {
            let span = f64::from(to) - f64::from(from);
            (f64::from(from) + span * t).round() as i32
        };
        Self {
            x: step(self.x, to.x),
            y: step(self.y, to.y),
        }
    }
}

impl From<(i32, i32)> for ScreenPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ScreenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Display size, read once when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
}

impl DisplayMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Where the handle parks while the panel is open: horizontally at half the
    /// display width, vertically pushed up by half the display height.
    pub fn parked_handle_position(&self) -> ScreenPosition {
        let half_width = clamp_i32(self.width) / 2;
        let half_height = clamp_i32(self.height) / 2;
        ScreenPosition::new(half_width, -half_height)
    }

    /// Panel height left after the parked handle and the status bar.
    pub fn panel_height(&self, handle_size: u32, status_bar_allowance: u32) -> u32 {
        self.height
            .saturating_sub(handle_size)
            .saturating_sub(status_bar_allowance)
    }

    /// Panel origin: pushed down by half the display height so the host's
    /// clamping keeps it flush with the bottom edge.
    pub fn panel_position(&self) -> ScreenPosition {
        ScreenPosition::new(0, clamp_i32(self.height) / 2)
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

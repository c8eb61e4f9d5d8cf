//! Session tuning knobs.

use std::time::Duration;

use crate::constants::{ANIMATION_DURATION, HANDLE_SIZE, STATUS_BAR_ALLOWANCE};
use crate::geometry::ScreenPosition;

/// Parameters fixed at session creation.
///
/// The defaults suit a phone-sized display (53 unit handle,
/// 25 unit status bar, 200 ms animations). Hosts with other units, such as the
/// terminal host where one unit is a cell, override the sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub animation_duration: Duration,
    pub handle_size: u32,
    pub status_bar_allowance: u32,
    pub default_position: ScreenPosition,
    /// Pointer travel (in either axis) ignored before a drag starts moving.
    pub drag_slop: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            animation_duration: ANIMATION_DURATION,
            handle_size: HANDLE_SIZE,
            status_bar_allowance: STATUS_BAR_ALLOWANCE,
            default_position: ScreenPosition::ORIGIN,
            drag_slop: 0,
        }
    }
}

impl OverlayConfig {
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_handle_size(mut self, handle_size: u32) -> Self {
        self.handle_size = handle_size;
        self
    }

    pub fn with_status_bar_allowance(mut self, allowance: u32) -> Self {
        self.status_bar_allowance = allowance;
        self
    }

    pub fn with_default_position(mut self, position: ScreenPosition) -> Self {
        self.default_position = position;
        self
    }

    pub fn with_drag_slop(mut self, slop: u32) -> Self {
        self.drag_slop = slop;
        self
    }
}

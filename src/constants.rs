//! Shared crate-wide constants.

use std::time::Duration;

/// Height of the collapsed handle in device-independent units.
pub const HANDLE_SIZE: u32 = 53;

/// Space reserved for the platform status bar when sizing the expanded panel.
///
/// The panel is `display height - HANDLE_SIZE - STATUS_BAR_ALLOWANCE` tall so
/// the parked handle and the status bar both stay visible above it.
pub const STATUS_BAR_ALLOWANCE: u32 = 25;

/// Wall-clock duration of the expand and collapse animations.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Interval at which the demo loop ticks animations when no input arrives.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Upper bound on the number of log lines retained by the debug log buffer.
pub const DEBUG_LOG_MAX_LINES: usize = 2000;

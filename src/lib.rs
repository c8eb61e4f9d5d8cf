//! A floating debug overlay: a draggable handle that expands into a tabbed
//! panel of debug pages.
//!
//! [`OverlaySession`] drives the handle and panel surfaces through a
//! [`SurfaceHost`]; [`TerminalSurfaceHost`] hosts them in a terminal.

pub mod animation;
pub mod config;
pub mod constants;
pub mod debug_log;
pub mod drag;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod overlay_view;
pub mod page;
pub mod pages;
pub mod session;
pub mod surface;
pub mod tabs;
pub mod tracing_sub;
pub mod ui;

pub use animation::{Clock, ManualClock, SystemClock};
pub use config::OverlayConfig;
pub use drivers::TerminalSurfaceHost;
pub use error::{OverlayError, Result};
pub use geometry::{DisplayMetrics, ScreenPosition};
pub use page::{PageError, PageFactory, Tab};
pub use session::{OverlaySession, SessionState};
pub use surface::{Extent, SurfaceError, SurfaceHost, SurfaceId, SurfaceSize, SurfaceSpec};

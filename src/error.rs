use thiserror::Error;

use crate::page::PageError;
use crate::session::SessionState;
use crate::surface::SurfaceError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The host refused a new surface. Fatal when creating a session.
    #[error("failed to create overlay surface: {0}")]
    SurfaceCreation(#[source] SurfaceError),
    #[error("{operation} is not allowed while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },
    #[error("tab {index} is out of range ({count} tabs registered)")]
    UnknownTab { index: usize, count: usize },
    #[error("an overlay session needs at least one tab")]
    NoTabs,
    #[error("overlay session has been torn down")]
    TornDown,
    #[error("failed to create content for tab {tab}: {source}")]
    ContentCreate { tab: usize, source: PageError },
    #[error("failed to dispose content of tab {tab}: {source}")]
    ContentDispose { tab: usize, source: PageError },
    #[error("surface operation failed: {0}")]
    Surface(#[from] SurfaceError),
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;

//! Contract with the platform compositor that owns floating surfaces.

use std::fmt;

use thiserror::Error;

use crate::geometry::ScreenPosition;

/// Opaque identifier handed out by a [`SurfaceHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// One axis of a surface size request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Exact(u32),
    /// Fill the display along this axis.
    MatchParent,
    /// Let the host size the surface to its content.
    WrapContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: Extent,
    pub height: Extent,
}

/// Everything the host needs to place a new floating surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub size: SurfaceSize,
    pub position: ScreenPosition,
    pub translucent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("overlay permission denied by the surface host")]
    PermissionDenied,
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceId),
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Platform service able to add, move, show/hide and remove floating surfaces.
///
/// Calls arrive on the UI thread only; implementations need no locking.
pub trait SurfaceHost {
    fn add_surface(&mut self, spec: SurfaceSpec) -> Result<SurfaceId, SurfaceError>;
    fn update_position(
        &mut self,
        id: SurfaceId,
        position: ScreenPosition,
    ) -> Result<(), SurfaceError>;
    fn set_visible(&mut self, id: SurfaceId, visible: bool) -> Result<(), SurfaceError>;
    fn remove_surface(&mut self, id: SurfaceId) -> Result<(), SurfaceError>;
}

impl<T: SurfaceHost + ?Sized> SurfaceHost for &mut T {
    fn add_surface(&mut self, spec: SurfaceSpec) -> Result<SurfaceId, SurfaceError> {
        (**self).add_surface(spec)
    }

    fn update_position(
        &mut self,
        id: SurfaceId,
        position: ScreenPosition,
    ) -> Result<(), SurfaceError> {
        (**self).update_position(id, position)
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) -> Result<(), SurfaceError> {
        (**self).set_visible(id, visible)
    }

    fn remove_surface(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        (**self).remove_surface(id)
    }
}

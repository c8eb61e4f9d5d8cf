//! [`SurfaceHost`] backed by a terminal viewport.
//!
//! Surfaces are bookkeeping only: the host records each surface's spec,
//! position and visibility and resolves them to `Rect`s for the renderer.
//! Placement follows centre gravity, the way phone compositors place overlay
//! windows: a position is the offset of the surface centre from the viewport
//! centre, and the resolved rectangle is clamped so it stays fully on screen.

use std::collections::BTreeMap;

use ratatui::layout::Rect;

use crate::geometry::{DisplayMetrics, ScreenPosition};
use crate::surface::{Extent, SurfaceError, SurfaceHost, SurfaceId, SurfaceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostedSurface {
    pub spec: SurfaceSpec,
    pub position: ScreenPosition,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct TerminalSurfaceHost {
    area: Rect,
    wrap_width: u16,
    overlays_allowed: bool,
    next_id: u64,
    // BTreeMap keyed by monotonically increasing ids doubles as z-order.
    surfaces: BTreeMap<SurfaceId, HostedSurface>,
}

impl TerminalSurfaceHost {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            wrap_width: area.width,
            overlays_allowed: true,
            next_id: 1,
            surfaces: BTreeMap::new(),
        }
    }

    /// Width used for `Extent::WrapContent`; the host cannot measure content.
    pub fn with_wrap_width(mut self, width: u16) -> Self {
        self.wrap_width = width;
        self
    }

    /// Simulate a platform without overlay permission.
    pub fn with_overlays_allowed(mut self, allowed: bool) -> Self {
        self.overlays_allowed = allowed;
        self
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Track a resized viewport. Surfaces are re-clamped on the next resolve.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn metrics(&self) -> DisplayMetrics {
        DisplayMetrics::new(u32::from(self.area.width), u32::from(self.area.height))
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&HostedSurface> {
        self.surfaces.get(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Visible surfaces bottom to top with their on-screen rectangles.
    pub fn visible_surfaces(&self) -> impl Iterator<Item = (SurfaceId, Rect)> + '_ {
        self.surfaces
            .iter()
            .filter(|(_, surface)| surface.visible)
            .map(|(id, surface)| (*id, self.place(surface)))
    }

    pub fn resolve(&self, id: SurfaceId) -> Option<Rect> {
        self.surfaces.get(&id).map(|surface| self.place(surface))
    }

    fn extent(&self, extent: Extent, parent: u16, wrap: u16) -> u16 {
        let value = match extent {
            Extent::Exact(n) => u16::try_from(n).unwrap_or(u16::MAX),
            Extent::MatchParent => parent,
            Extent::WrapContent => wrap,
        };
        value.min(parent)
    }

    fn place(&self, surface: &HostedSurface) -> Rect {
        let area = self.area;
        let width = self.extent(surface.spec.size.width, area.width, self.wrap_width);
        let height = self.extent(surface.spec.size.height, area.height, 1);
        let place_axis = |origin: u16, parent: u16, len: u16, offset: i32| -> u16 {
            let slack = i32::from(parent - len);
            let centred = (slack / 2).saturating_add(offset);
            let clamped = centred.clamp(0, slack);
            origin.saturating_add(clamped as u16)
        };
        Rect {
            x: place_axis(area.x, area.width, width, surface.position.x),
            y: place_axis(area.y, area.height, height, surface.position.y),
            width,
            height,
        }
    }

    fn get_mut(&mut self, id: SurfaceId) -> Result<&mut HostedSurface, SurfaceError> {
        self.surfaces
            .get_mut(&id)
            .ok_or(SurfaceError::UnknownSurface(id))
    }
}

impl SurfaceHost for TerminalSurfaceHost {
    fn add_surface(&mut self, spec: SurfaceSpec) -> Result<SurfaceId, SurfaceError> {
        if !self.overlays_allowed {
            return Err(SurfaceError::PermissionDenied);
        }
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(
            id,
            HostedSurface {
                spec,
                position: spec.position,
                visible: true,
            },
        );
        tracing::debug!(surface = %id, position = %spec.position, "surface added");
        Ok(id)
    }

    fn update_position(
        &mut self,
        id: SurfaceId,
        position: ScreenPosition,
    ) -> Result<(), SurfaceError> {
        self.get_mut(id)?.position = position;
        Ok(())
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) -> Result<(), SurfaceError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    fn remove_surface(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        if self.surfaces.remove(&id).is_none() {
            return Err(SurfaceError::UnknownSurface(id));
        }
        tracing::debug!(surface = %id, "surface removed");
        Ok(())
    }
}

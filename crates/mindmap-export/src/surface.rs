//! Scoped reconfiguration of the viewport for capture

use mindmap_core::{Rect, Size, Viewport, ViewportState};
use tracing::debug;

/// Points the viewport at the export bounds for as long as it lives and puts
/// the previous rectangle and surface size back when dropped, whether the
/// capture succeeded, failed, or unwound.
pub struct SurfaceGuard<'a> {
    viewport: &'a mut Viewport,
    saved: ViewportState,
}

impl<'a> SurfaceGuard<'a> {
    pub fn acquire(viewport: &'a mut Viewport, bounds: Rect, capture: Size) -> Self {
        let saved = viewport.state();
        viewport.restore(ViewportState { rect: bounds, screen: capture });
        debug!("Surface set to {:?} at {}x{}", bounds, capture.width, capture.height);
        SurfaceGuard { viewport, saved }
    }

    pub fn viewport(&self) -> &Viewport {
        self.viewport
    }

    /// State that will be restored on drop.
    pub fn saved(&self) -> ViewportState {
        self.saved
    }
}

impl Drop for SurfaceGuard<'_> {
    fn drop(&mut self) {
        self.viewport.restore(self.saved);
        debug!("Surface restored to {:?}", self.saved.rect);
    }
}

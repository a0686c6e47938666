//! Pan/zoom viewport: the world rectangle mapped onto the drawing surface

use crate::model::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default world rectangle shown at start-up.
pub const INITIAL_VIEW: Rect = Rect::new(0.0, 0.0, 1600.0, 800.0);
/// Default world position of the root.
pub const INITIAL_CENTER: Point = Point::new(800.0, 400.0);

/// Zoom level bounds, as a multiple of the initial width.
const MIN_ZOOM_RATIO: f64 = 0.05;
const MAX_ZOOM_RATIO: f64 = 20.0;

/// Wheel zoom factors: scrolling down zooms out.
pub const ZOOM_OUT_FACTOR: f64 = 1.1;
pub const ZOOM_IN_FACTOR: f64 = 0.9;

/// Everything needed to put a viewport back exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub rect: Rect,
    pub screen: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    rect: Rect,
    initial: Rect,
    screen: Size,
}

impl Viewport {
    pub fn new(initial: Rect, screen: Size) -> Self {
        Viewport { rect: initial, initial, screen }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn initial(&self) -> Rect {
        self.initial
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Replace the visible rectangle. Non-finite or empty rectangles are ignored.
    pub fn set_rect(&mut self, rect: Rect) {
        if rect.is_finite() && rect.width > 0.0 && rect.height > 0.0 {
            self.rect = rect;
        } else {
            warn!("Ignoring invalid viewport {:?}", rect);
        }
    }

    /// Resize the drawing surface. Unusable sizes are ignored.
    pub fn set_screen(&mut self, screen: Size) {
        if screen.is_usable() {
            self.screen = screen;
        } else {
            warn!("Ignoring invalid surface size {:?}", screen);
        }
    }

    /// World units per screen pixel, per axis.
    fn ratio(&self) -> (f64, f64) {
        (self.rect.width / self.screen.width, self.rect.height / self.screen.height)
    }

    /// Map a screen point to world coordinates under the current rectangle.
    pub fn to_world(&self, screen: Point) -> Point {
        let (rx, ry) = self.ratio();
        Point::new(self.rect.x + screen.x * rx, self.rect.y + screen.y * ry)
    }

    /// Map a world point to screen coordinates.
    pub fn to_screen(&self, world: Point) -> Point {
        let (rx, ry) = self.ratio();
        Point::new((world.x - self.rect.x) / rx, (world.y - self.rect.y) / ry)
    }

    /// Shift the view by a screen-space pointer delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let (rx, ry) = self.ratio();
        self.rect.x -= dx * rx;
        self.rect.y -= dy * ry;
    }

    /// Scale the view by `factor` keeping the world point under `screen` fixed.
    ///
    /// The factor is clamped so the zoom level stays within bounds; the
    /// applied factor is returned.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            warn!("Ignoring zoom factor {}", factor);
            return 1.0;
        }
        let min_width = self.initial.width * MIN_ZOOM_RATIO;
        let max_width = self.initial.width * MAX_ZOOM_RATIO;
        let target = (self.rect.width * factor).clamp(min_width, max_width);
        let factor = target / self.rect.width;

        let anchor = self.to_world(screen);
        self.rect.x = anchor.x - (anchor.x - self.rect.x) * factor;
        self.rect.y = anchor.y - (anchor.y - self.rect.y) * factor;
        self.rect.width *= factor;
        self.rect.height *= factor;
        debug!("Zoomed by {:.3} around ({:.1}, {:.1})", factor, anchor.x, anchor.y);
        factor
    }

    /// Zoom for one wheel notch: positive `delta_y` zooms out.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> f64 {
        let factor = if delta_y > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR };
        self.zoom_at(screen, factor)
    }

    /// Restore the initial size, centred on `center` (the root's position).
    pub fn reset(&mut self, center: Point) {
        self.rect = Rect::centered_on(center, self.initial.width, self.initial.height);
    }

    pub fn state(&self) -> ViewportState {
        ViewportState { rect: self.rect, screen: self.screen }
    }

    pub fn restore(&mut self, state: ViewportState) {
        self.rect = state.rect;
        self.screen = state.screen;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(INITIAL_VIEW, Size::new(INITIAL_VIEW.width, INITIAL_VIEW.height))
    }
}

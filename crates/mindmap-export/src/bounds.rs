//! World-space bounds of everything that gets exported

use mindmap_core::geometry::Footprint;
use mindmap_core::{GraphStore, Rect, Size};

/// Margin added around the union of node footprints.
pub const EXPORT_PADDING: f64 = 30.0;
/// Smallest content extent on either axis.
pub const MIN_CONTENT_SIZE: f64 = 100.0;
/// Smallest rasterized width, in pixels.
pub const MIN_CAPTURE_WIDTH: f64 = 1200.0;
/// Largest rasterized side, in pixels.
pub const MAX_CAPTURE_SIDE: f64 = 8192.0;

/// Rectangle to export: the padded union of every node footprint, or the
/// current view when only the root exists.
pub fn export_bounds(store: &GraphStore, current_view: Rect) -> Rect {
    if store.is_empty() {
        return current_view;
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for node in store.all() {
        let fp = Footprint::of(node);
        let (hw, hh) = (fp.width() / 2.0, fp.height() / 2.0);
        min_x = min_x.min(node.position.x - hw - EXPORT_PADDING);
        min_y = min_y.min(node.position.y - hh - EXPORT_PADDING);
        max_x = max_x.max(node.position.x + hw + EXPORT_PADDING);
        max_y = max_y.max(node.position.y + hh + EXPORT_PADDING);
    }

    Rect::new(
        min_x,
        min_y,
        (max_x - min_x).max(MIN_CONTENT_SIZE),
        (max_y - min_y).max(MIN_CONTENT_SIZE),
    )
}

/// Surface size used while capturing `bounds`: at least
/// [`MIN_CAPTURE_WIDTH`] wide, with the content's aspect ratio, scaled down
/// so neither side exceeds [`MAX_CAPTURE_SIDE`]. Both sides are at least one
/// pixel.
pub fn capture_size(bounds: Rect) -> Size {
    let width = bounds.width.max(MIN_CAPTURE_WIDTH);
    let height = width / bounds.width * bounds.height;
    let scale = (MAX_CAPTURE_SIDE / width.max(height)).min(1.0);
    Size::new((width * scale).max(1.0), (height * scale).max(1.0))
}

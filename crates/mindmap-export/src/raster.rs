//! SVG-to-PNG rasterization

use crate::error::{ExportError, Result};
use resvg::tiny_skia;
use resvg::usvg;
use std::sync::Arc;

/// Turns an SVG document into PNG bytes of the requested pixel size.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Rasterizer backed by resvg, using the fonts installed on the system.
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        ResvgRasterizer { fontdb: Arc::new(fontdb) }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| ExportError::Rasterize(format!("failed to parse SVG: {e}")))?;

        let size = tree.size();
        if width == 0 || height == 0 {
            return Err(ExportError::Rasterize("computed image dimensions are zero".to_string()));
        }

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| ExportError::Rasterize("failed to allocate pixmap".to_string()))?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| ExportError::Rasterize(format!("failed to encode PNG: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20">
<rect x="0" y="0" width="40" height="20" fill="#E74C3C"/>
</svg>"##;

    #[test]
    fn test_renders_png_at_requested_size() {
        let png = ResvgRasterizer::new().rasterize(SVG, 80, 40).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let pixmap = tiny_skia::Pixmap::decode_png(&png).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (80, 40));
    }

    #[test]
    fn test_invalid_svg_is_a_rasterize_error() {
        let err = ResvgRasterizer::new().rasterize("<not svg", 10, 10).unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));
    }
}

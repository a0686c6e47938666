//! The export pipeline: capture the whole diagram, lay out pages, write PDF

use crate::bounds::{capture_size, export_bounds};
use crate::error::{ExportError, Result};
use crate::layout::{detail_entries, layout};
use crate::pdf::render_pdf;
use crate::raster::{Rasterizer, ResvgRasterizer};
use crate::surface::SurfaceGuard;
use crate::svg::render_svg;
use chrono::NaiveDate;
use mindmap_core::{Diagram, Scene};
use std::time::Duration;
use tracing::{info, warn};

/// Default pause between reconfiguring the surface and capturing it.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(450);
pub const DEFAULT_TITLE: &str = "Mind Map";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
    pub settle: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { title: DEFAULT_TITLE.to_string(), settle: DEFAULT_SETTLE }
    }
}

/// Dated file name for an exported document.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("mindmap-{}.pdf", date.format("%Y%m%d"))
}

pub struct Exporter {
    rasterizer: Box<dyn Rasterizer>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self::with_rasterizer(ResvgRasterizer::new(), options)
    }

    pub fn with_rasterizer(rasterizer: impl Rasterizer + 'static, options: ExportOptions) -> Self {
        Exporter { rasterizer: Box::new(rasterizer), options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export `diagram` to PDF bytes.
    ///
    /// The diagram is borrowed mutably for the whole call. Its viewport and
    /// surface size are changed for the capture and restored before this
    /// returns, on every path.
    pub async fn export(&self, diagram: &mut Diagram) -> Result<Vec<u8>> {
        let (store, viewport, visual) = diagram.export_parts();

        let bounds = export_bounds(store, viewport.rect());
        if !bounds.is_finite() || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Err(ExportError::Nothing);
        }
        let capture = capture_size(bounds);
        let (px_w, px_h) = (capture.width.round() as u32, capture.height.round() as u32);

        let png = {
            let guard = SurfaceGuard::acquire(viewport, bounds, capture);
            tokio::time::sleep(self.options.settle).await;
            let scene = Scene::build(store, guard.viewport(), None, visual);
            let svg = render_svg(&scene)?;
            self.rasterizer.rasterize(&svg, px_w, px_h).inspect_err(|e| {
                warn!("Capture failed, surface restored: {}", e);
            })?
        };

        let entries = detail_entries(store);
        let pages = layout(&self.options.title, (px_w, px_h), &entries)?;
        let bytes = render_pdf(&self.options.title, &pages, &png)?;
        info!(
            "Exported {} node(s) on {} page(s) ({}x{} capture)",
            entries.len(),
            pages.len(),
            px_w,
            px_h
        );
        Ok(bytes)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

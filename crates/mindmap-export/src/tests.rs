//! Pipeline tests for mindmap-export

use crate::bounds::{capture_size, export_bounds};
use crate::error::{ExportError, Result};
use crate::pipeline::{export_file_name, ExportOptions, Exporter};
use crate::raster::Rasterizer;
use futures_util::FutureExt;
use mindmap_core::{Catalog, CatalogEntry, Diagram, DiagramOptions, RootVisual};
use resvg::tiny_skia;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::time::Duration;

fn diagram() -> Diagram {
    let catalog = Catalog::new([
        CatalogEntry::new("EC2", "Compute", "Virtual servers"),
        CatalogEntry::new("S3", "Storage", "Object storage"),
    ]);
    let mut diagram = Diagram::new(
        catalog,
        RootVisual::default(),
        DiagramOptions { seed: Some(3), ..Default::default() },
    );
    diagram.add_entry("EC2");
    diagram.add_entry("S3");
    diagram.wheel(300.0, 200.0, -1.0);
    diagram.resize(1024.0, 640.0);
    diagram
}

fn options() -> ExportOptions {
    ExportOptions { title: "Test map".to_string(), settle: Duration::ZERO }
}

/// Records the requested size and returns a blank PNG.
#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<(u32, u32, String)>>,
}

impl Rasterizer for &'static Recording {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push((width, height, svg.to_string()));
        let mut pixmap = tiny_skia::Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(pixmap.encode_png().unwrap())
    }
}

struct Failing;

impl Rasterizer for Failing {
    fn rasterize(&self, _svg: &str, _width: u32, _height: u32) -> Result<Vec<u8>> {
        Err(ExportError::Rasterize("no surface".to_string()))
    }
}

struct Panicking;

impl Rasterizer for Panicking {
    fn rasterize(&self, _svg: &str, _width: u32, _height: u32) -> Result<Vec<u8>> {
        panic!("renderer crashed");
    }
}

#[tokio::test]
async fn test_export_captures_bounds_and_restores_viewport() {
    let recording: &'static Recording = Box::leak(Box::default());
    let mut diagram = diagram();
    let before = diagram.viewport().state();
    let bounds = export_bounds(diagram.store(), before.rect);
    let capture = capture_size(bounds);

    let exporter = Exporter::with_rasterizer(recording, options());
    let bytes = exporter.export(&mut diagram).await.unwrap();

    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(diagram.viewport().state(), before);

    let calls = recording.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (w, h, svg) = &calls[0];
    assert_eq!(*w, capture.width.round() as u32);
    assert_eq!(*h, capture.height.round() as u32);
    assert!(*w >= 1200);
    let view_box = format!("viewBox=\"{} {} {} {}\"", bounds.x, bounds.y, bounds.width, bounds.height);
    assert!(svg.contains(&view_box), "{view_box} not in svg");
}

#[tokio::test]
async fn test_failed_rasterization_restores_viewport() {
    let mut diagram = diagram();
    let before = diagram.viewport().state();

    let err = Exporter::with_rasterizer(Failing, options())
        .export(&mut diagram)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Rasterize(_)));
    assert_eq!(diagram.viewport().state(), before);
    assert_eq!(diagram.store().len(), 3);
}

#[tokio::test]
async fn test_panicking_rasterizer_restores_viewport() {
    let mut diagram = diagram();
    let before = diagram.viewport().state();

    let exporter = Exporter::with_rasterizer(Panicking, options());
    let outcome = AssertUnwindSafe(exporter.export(&mut diagram)).catch_unwind().await;

    assert!(outcome.is_err());
    assert_eq!(diagram.viewport().state(), before);
}

#[tokio::test]
async fn test_root_only_export_uses_current_view() {
    let recording: &'static Recording = Box::leak(Box::default());
    let mut diagram = Diagram::new(Catalog::default(), RootVisual::default(), DiagramOptions::default());
    let view = diagram.viewport().rect();

    Exporter::with_rasterizer(recording, options()).export(&mut diagram).await.unwrap();

    let calls = recording.calls.lock().unwrap();
    let view_box = format!("viewBox=\"{} {} {} {}\"", view.x, view.y, view.width, view.height);
    assert!(calls[0].2.contains(&view_box));
    assert_eq!(calls[0].0, 1600);
}

#[test]
fn test_export_file_name_is_dated() {
    let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    assert_eq!(export_file_name(date), "mindmap-20250131.pdf");
}

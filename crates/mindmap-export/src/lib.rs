//! PDF export of a diagram: bounds, capture, page layout

pub mod bounds;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod surface;
pub mod svg;

#[cfg(test)]
mod tests;

pub use error::ExportError;
pub use pipeline::{export_file_name, ExportOptions, Exporter, DEFAULT_SETTLE};
pub use raster::{Rasterizer, ResvgRasterizer};
pub use surface::SurfaceGuard;

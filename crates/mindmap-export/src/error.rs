//! Export failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("page layout failed: {0}")]
    Layout(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("failed to write SVG")]
    Svg(#[from] std::fmt::Error),

    #[error("nothing drawable to export")]
    Nothing,
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

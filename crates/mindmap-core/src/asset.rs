//! Root visual: an image asset when one is available, otherwise a text glyph

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File names tried, in order, by [`RootVisual::locate`].
pub const LOGO_CANDIDATES: &[&str] = &[
    "logo.png",
    "logo.jpg",
    "logo.jpeg",
    "logo.svg",
    "root.png",
    "root.svg",
];

/// Glyph drawn on the root when no image is found. Plain ASCII, so every
/// font the rasterizer may fall back to can draw it.
pub const DEFAULT_GLYPH: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootVisual {
    Image { mime: String, bytes: Vec<u8> },
    Glyph(String),
}

impl RootVisual {
    /// Probe `dir` for a logo file. Unreadable or missing files fall back to
    /// the default glyph.
    pub fn locate(dir: &Path) -> Self {
        match Self::find_candidate(dir) {
            Some(path) => Self::from_file(&path).unwrap_or_else(|e| {
                warn!("Could not read root image {}: {}", path.display(), e);
                RootVisual::default()
            }),
            None => {
                debug!("No root image in {}, using glyph", dir.display());
                RootVisual::default()
            }
        }
    }

    fn find_candidate(dir: &Path) -> Option<PathBuf> {
        LOGO_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Read an image file, guessing its MIME type from the extension.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!("Loaded root image {} ({}, {} bytes)", path.display(), mime, bytes.len());
        Ok(RootVisual::Image { mime: mime.essence_str().to_string(), bytes })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, RootVisual::Image { .. })
    }

    /// `data:` URI for images, `None` for glyphs.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            RootVisual::Image { mime, bytes } => {
                Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
            }
            RootVisual::Glyph(_) => None,
        }
    }
}

impl Default for RootVisual {
    fn default() -> Self {
        RootVisual::Glyph(DEFAULT_GLYPH.to_string())
    }
}

//! Graph model, placement, viewport, interaction, persistence and scene diffs

pub mod asset;
pub mod catalog;
pub mod diagram;
pub mod diff;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod placement;
pub mod scene;
pub mod selection;
pub mod stats;
pub mod viewport;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use asset::RootVisual;
pub use catalog::{Catalog, CatalogEntry};
pub use diagram::{Diagram, DiagramOptions};
pub use diff::{DiffEngine, SceneDiff};
pub use error::{DiagramError, Result};
pub use geometry::{clip_edge, fit_label, Footprint};
pub use graph::GraphStore;
pub use interaction::{Effect, InteractionController, PointerInput, PointerState};
pub use model::{EdgeSegment, Node, Notice, Point, Rect, Severity, Size, ROOT_ID};
pub use persistence::{document_file_name, load_document, save_document, Document, Loaded, NodeRecord};
pub use placement::PlacementEngine;
pub use scene::{RootBadge, Scene, SceneEdge, SceneNode};
pub use stats::Stats;
pub use viewport::{Viewport, ViewportState};

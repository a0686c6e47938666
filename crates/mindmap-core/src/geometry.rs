//! Node footprints and edge clipping
//!
//! A footprint is the visual bound of a node around its centre. The root is
//! drawn as a fixed ellipse-like badge; ordinary nodes are rectangles sized to
//! their label. Edges run boundary-to-boundary, and an edge whose endpoints
//! overlap is degenerate and never drawn.

use crate::model::{EdgeSegment, Node, Point};

pub const ROOT_WIDTH: f64 = 80.0;
pub const ROOT_HEIGHT: f64 = 60.0;
/// Clipping radius of the root badge.
pub const ROOT_RADIUS: f64 = 40.0;

pub const NODE_HEIGHT: f64 = 40.0;
pub const MIN_NODE_WIDTH: f64 = 100.0;
pub const MAX_NODE_WIDTH: f64 = 350.0;
/// Estimated pixels per label character.
pub const CHAR_WIDTH: f64 = 7.0;
/// Total horizontal padding around a label.
pub const LABEL_PADDING: f64 = 20.0;
/// Rectangle width divided by this gives the clipping radius.
const RADIUS_DIVISOR: f64 = 2.2;

/// Edges shorter than this are never drawn.
pub const MIN_EDGE_LENGTH: f64 = 10.0;

/// Visual bound of a node, centred on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    Ellipse { width: f64, height: f64 },
    Rectangle { width: f64, height: f64 },
}

impl Footprint {
    pub fn of(node: &Node) -> Self {
        if node.is_central {
            Footprint::Ellipse { width: ROOT_WIDTH, height: ROOT_HEIGHT }
        } else {
            Footprint::Rectangle {
                width: fit_label(&node.label).width,
                height: NODE_HEIGHT,
            }
        }
    }

    pub fn width(&self) -> f64 {
        match *self {
            Footprint::Ellipse { width, .. } | Footprint::Rectangle { width, .. } => width,
        }
    }

    pub fn height(&self) -> f64 {
        match *self {
            Footprint::Ellipse { height, .. } | Footprint::Rectangle { height, .. } => height,
        }
    }

    /// Half-extent used to clip edges and detect overlap.
    pub fn radius(&self) -> f64 {
        match *self {
            Footprint::Ellipse { .. } => ROOT_RADIUS,
            Footprint::Rectangle { width, .. } => width / RADIUS_DIVISOR,
        }
    }

    /// Whether `point` falls inside this footprint placed at `center`.
    pub fn contains(&self, center: Point, point: Point) -> bool {
        let d = point - center;
        match *self {
            Footprint::Ellipse { width, height } => {
                let (rx, ry) = (width / 2.0, height / 2.0);
                (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
            }
            Footprint::Rectangle { width, height } => {
                d.x.abs() <= width / 2.0 && d.y.abs() <= height / 2.0
            }
        }
    }
}

/// Rectangle width for a label and the text actually displayed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFit {
    pub width: f64,
    pub display: String,
}

/// Size a node rectangle to its label, truncating with an ellipsis when the
/// label is wider than the maximum width allows.
pub fn fit_label(label: &str) -> LabelFit {
    let len = label.chars().count();
    let ideal = len as f64 * CHAR_WIDTH + LABEL_PADDING;
    let width = ideal.clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH);
    let max_chars = ((width - LABEL_PADDING) / CHAR_WIDTH).floor() as usize;

    let display = if len > max_chars && max_chars > 0 {
        if max_chars <= 3 {
            format!("{}..", label.chars().take(max_chars).collect::<String>())
        } else {
            format!("{}...", label.chars().take(max_chars - 3).collect::<String>())
        }
    } else {
        label.to_string()
    };

    LabelFit { width, display }
}

/// Visible segment of the edge `source → target`, or `None` when the edge is
/// degenerate (overlapping footprints or too short).
pub fn clip_edge(source: &Node, target: &Node) -> Option<EdgeSegment> {
    let source_radius = Footprint::of(source).radius();
    let target_radius = Footprint::of(target).radius();

    let d = target.position - source.position;
    let dist = d.x.hypot(d.y);
    if !dist.is_finite() || dist < source_radius + target_radius || dist < MIN_EDGE_LENGTH {
        return None;
    }

    let (ux, uy) = (d.x / dist, d.y / dist);
    Some(EdgeSegment {
        from: Point::new(
            source.position.x + ux * source_radius,
            source.position.y + uy * source_radius,
        ),
        to: Point::new(
            target.position.x - ux * target_radius,
            target.position.y - uy * target_radius,
        ),
    })
}

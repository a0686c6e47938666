//! Core data structures for the diagram

use serde::{Deserialize, Serialize};

/// Reserved id of the root node. Never deletable, never duplicated.
pub const ROOT_ID: &str = "central_root_node";

/// Default label shown for the root when no image asset is available.
pub const DEFAULT_ROOT_LABEL: &str = "Root";

/// Category assigned to the root node.
pub const ROOT_CATEGORY: &str = "Central";

/// Category used when an entry carries none.
pub const FALLBACK_CATEGORY: &str = "Other";

/// A point (or vector) in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle in world space (an SVG-style view box).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle of the given size centred on `center`.
    pub fn centered_on(center: Point, width: f64, height: f64) -> Self {
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// A single node in the diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique id, also the display key of catalog entries.
    pub id: String,
    pub label: String,
    pub category: String,
    pub description: String,
    pub position: Point,
    /// `None` only for the root.
    pub parent_id: Option<String>,
    pub is_central: bool,
    pub is_custom: bool,
}

impl Node {
    /// The root node, placed at `position`.
    pub fn root(label: impl Into<String>, position: Point) -> Self {
        Node {
            id: ROOT_ID.to_string(),
            label: label.into(),
            category: ROOT_CATEGORY.to_string(),
            description: String::new(),
            position,
            parent_id: None,
            is_central: true,
            is_custom: false,
        }
    }

    /// An ordinary node. The parent is assigned on insertion.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        position: Point,
    ) -> Self {
        let id = id.into();
        Node {
            label: id.clone(),
            id,
            category: category.into(),
            description: description.into(),
            position,
            parent_id: None,
            is_central: false,
            is_custom: false,
        }
    }

    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

/// A clipped, drawable segment of a parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub from: Point,
    pub to: Point,
}

impl EdgeSegment {
    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Transient message describing the outcome of a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice { severity: Severity::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice { severity: Severity::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice { severity: Severity::Error, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}

//! Render-ready snapshot of a diagram

use crate::asset::RootVisual;
use crate::geometry::{fit_label, Footprint};
use crate::graph::GraphStore;
use crate::model::{Node, Point, Rect, Size, FALLBACK_CATEGORY};
use crate::stats::Stats;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// Fill colours per category; anything unlisted uses the fallback colour.
const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("Machine Learning", "#8E44AD"),
    ("Developer Tools", "#2ECC71"),
    ("Compute", "#E74C3C"),
    ("Networking & Content Delivery", "#F39C12"),
    ("Migration & Transfer", "#9B59B6"),
    ("Management & Governance", "#34495E"),
    ("Security, Identity & Compliance", "#E67E22"),
    ("Storage", "#D35400"),
    ("Application Integration", "#16A085"),
    ("Database", "#27AE60"),
    ("Analytics", "#7D3C98"),
    ("IoT", "#FF6B35"),
    ("Blockchain", "#6C5CE7"),
    ("Quantum", "#A29BFE"),
    ("Containers", "#00B894"),
    ("Serverless", "#FDCB6E"),
    ("Mobile", "#E17055"),
    ("Custom Notes", "#A6B1E1"),
];

pub const FALLBACK_COLOR: &str = "#7F8C8D";
pub const ROOT_COLOR: &str = "#232F3E";

/// Fill colour for a category.
pub fn category_color(category: &str) -> &'static str {
    if category == FALLBACK_CATEGORY {
        return FALLBACK_COLOR;
    }
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// A node with its drawing footprint resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    /// Label as drawn, possibly truncated.
    pub display: String,
    pub category: String,
    pub description: String,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub parent_id: Option<String>,
    pub is_central: bool,
    pub is_custom: bool,
}

impl SceneNode {
    pub fn from_node(node: &Node) -> Self {
        let footprint = Footprint::of(node);
        let (display, color) = if node.is_central {
            (node.label.clone(), ROOT_COLOR)
        } else {
            (fit_label(&node.label).display, category_color(&node.category))
        };
        SceneNode {
            id: node.id.clone(),
            label: node.label.clone(),
            display,
            category: node.category.clone(),
            description: node.description.clone(),
            position: node.position,
            width: footprint.width(),
            height: footprint.height(),
            color: color.to_string(),
            parent_id: node.parent_id.clone(),
            is_central: node.is_central,
            is_custom: node.is_custom,
        }
    }

    /// Axis-aligned bound of the footprint.
    pub fn bounds(&self) -> Rect {
        Rect::centered_on(self.position, self.width, self.height)
    }
}

/// A drawn edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub source: String,
    pub target: String,
    pub from: Point,
    pub to: Point,
}

impl SceneEdge {
    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }
}

/// How the root is decorated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RootBadge {
    Image { data_uri: String },
    Glyph { text: String },
}

impl From<&RootVisual> for RootBadge {
    fn from(visual: &RootVisual) -> Self {
        match (visual.data_uri(), visual) {
            (Some(data_uri), _) => RootBadge::Image { data_uri },
            (None, RootVisual::Glyph(text)) => RootBadge::Glyph { text: text.clone() },
            (None, RootVisual::Image { .. }) => RootBadge::Glyph { text: String::new() },
        }
    }
}

/// Everything a client or the exporter needs to draw the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Insertion order, root first.
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub viewport: Rect,
    pub screen: Size,
    pub selected: Option<String>,
    pub stats: Stats,
    pub root_badge: RootBadge,
}

impl Scene {
    pub fn build(
        store: &GraphStore,
        viewport: &Viewport,
        selected: Option<&str>,
        visual: &RootVisual,
    ) -> Self {
        let nodes = store.all().map(SceneNode::from_node).collect();
        let mut edges: Vec<SceneEdge> = store
            .edges()
            .map(|e| SceneEdge {
                source: e.source.to_string(),
                target: e.target.to_string(),
                from: e.segment.from,
                to: e.segment.to,
            })
            .collect();
        edges.sort_by(|a, b| a.key().cmp(&b.key()));

        Scene {
            nodes,
            edges,
            viewport: viewport.rect(),
            screen: viewport.screen(),
            selected: selected.map(str::to_string),
            stats: Stats::compute(store),
            root_badge: RootBadge::from(visual),
        }
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root(&self) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.is_central)
    }

    /// Nodes other than the root.
    pub fn members(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|n| !n.is_central)
    }
}

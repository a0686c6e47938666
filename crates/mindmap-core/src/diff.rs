//! Scene diff computation for incremental client updates

use crate::model::{Rect, Size};
use crate::scene::{Scene, SceneEdge, SceneNode};
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Represents a change to the scene that should be broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDiff {
    /// Monotonically increasing diff sequence number.
    pub sequence: u64,
    /// Nodes added in this update.
    pub added_nodes: Vec<SceneNode>,
    /// Ids of nodes removed in this update.
    pub removed_nodes: Vec<String>,
    /// Nodes whose position, label or parent changed.
    pub modified_nodes: Vec<SceneNode>,
    /// Edges added or re-clipped in this update.
    pub upserted_edges: Vec<SceneEdge>,
    /// `(source, target)` pairs no longer drawn.
    pub removed_edges: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<Size>,
    /// Present when the selection changed; the inner value is the new selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Option<String>>,
    pub stats: Stats,
}

impl SceneDiff {
    /// Create an empty diff with given sequence number.
    pub fn new(sequence: u64, stats: Stats) -> Self {
        SceneDiff {
            sequence,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            modified_nodes: Vec::new(),
            upserted_edges: Vec::new(),
            removed_edges: Vec::new(),
            viewport: None,
            screen: None,
            selected: None,
            stats,
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.upserted_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.viewport.is_none()
            && self.screen.is_none()
            && self.selected.is_none()
    }
}

/// Diff state for incremental updates.
#[derive(Debug, Default)]
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        DiffEngine { sequence: 0 }
    }

    /// Compute the difference between two scenes.
    /// Returns a SceneDiff with the sequence number incremented.
    pub fn compute_diff(&mut self, old: &Scene, new: &Scene) -> SceneDiff {
        self.sequence += 1;
        let mut diff = SceneDiff::new(self.sequence, new.stats);

        let old_nodes: HashMap<&str, &SceneNode> =
            old.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let new_ids: HashSet<&str> = new.nodes.iter().map(|n| n.id.as_str()).collect();

        for node in &new.nodes {
            match old_nodes.get(node.id.as_str()) {
                None => diff.added_nodes.push(node.clone()),
                Some(prev) if *prev != node => diff.modified_nodes.push(node.clone()),
                Some(_) => {}
            }
        }
        diff.removed_nodes = old
            .nodes
            .iter()
            .filter(|n| !new_ids.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();

        let old_edges: HashMap<(&str, &str), &SceneEdge> =
            old.edges.iter().map(|e| (e.key(), e)).collect();
        let new_keys: HashSet<(&str, &str)> = new.edges.iter().map(SceneEdge::key).collect();

        diff.upserted_edges = new
            .edges
            .iter()
            .filter(|e| old_edges.get(&e.key()).is_none_or(|prev| *prev != *e))
            .cloned()
            .collect();
        diff.removed_edges = old
            .edges
            .iter()
            .filter(|e| !new_keys.contains(&e.key()))
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();

        if old.viewport != new.viewport {
            diff.viewport = Some(new.viewport);
        }
        if old.screen != new.screen {
            diff.screen = Some(new.screen);
        }
        if old.selected != new.selected {
            diff.selected = Some(new.selected.clone());
        }

        diff
    }

    /// Get current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::RootVisual;
    use crate::graph::GraphStore;
    use crate::model::{Node, Point, ROOT_ID};
    use crate::viewport::Viewport;

    fn scene(store: &GraphStore, selected: &str) -> Scene {
        Scene::build(store, &Viewport::default(), Some(selected), &RootVisual::default())
    }

    #[test]
    fn test_identical_scenes_produce_empty_diff() {
        let store = GraphStore::new(Node::root("Root", Point::new(800.0, 400.0)));
        let mut engine = DiffEngine::new();
        let diff = engine.compute_diff(&scene(&store, ROOT_ID), &scene(&store, ROOT_ID));
        assert!(diff.is_empty());
        assert_eq!(diff.sequence, 1);
    }

    #[test]
    fn test_move_reports_node_and_reclipped_edges() {
        let mut store = GraphStore::new(Node::root("Root", Point::new(800.0, 400.0)));
        store.insert(Node::new("EC2", "Compute", "", Point::new(1000.0, 400.0)), ROOT_ID).unwrap();
        store.insert(Node::new("S3", "Storage", "", Point::new(1200.0, 400.0)), "EC2").unwrap();
        let before = scene(&store, ROOT_ID);

        store.move_node("EC2", Point::new(1000.0, 600.0)).unwrap();
        store.remove("S3").unwrap();
        let after = scene(&store, "EC2");

        let mut engine = DiffEngine::new();
        let diff = engine.compute_diff(&before, &after);
        assert!(diff.added_nodes.is_empty());
        assert_eq!(diff.removed_nodes, ["S3"]);
        assert_eq!(diff.modified_nodes.len(), 1);
        assert_eq!(diff.modified_nodes[0].id, "EC2");
        assert_eq!(diff.upserted_edges.len(), 1);
        assert_eq!(diff.removed_edges, [("EC2".to_string(), "S3".to_string())]);
        assert_eq!(diff.selected, Some(Some("EC2".to_string())));
        assert_eq!(diff.stats.nodes, 1);
    }
}

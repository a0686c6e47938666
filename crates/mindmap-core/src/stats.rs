//! Diagram statistics, recomputed from the store on demand

use crate::graph::GraphStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counters shown next to the diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Non-root nodes.
    pub nodes: usize,
    /// Distinct non-empty categories among non-root nodes.
    pub categories: usize,
}

impl Stats {
    pub fn compute(store: &GraphStore) -> Self {
        let mut categories = BTreeSet::new();
        let mut nodes = 0;
        for node in store.all().filter(|n| !n.is_central) {
            nodes += 1;
            if !node.category.is_empty() {
                categories.insert(node.category.as_str());
            }
        }
        Stats { nodes, categories: categories.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Point, ROOT_ID};

    #[test]
    fn test_root_is_not_counted() {
        let mut store = GraphStore::new(Node::root("Root", Point::new(800.0, 400.0)));
        assert_eq!(Stats::compute(&store), Stats::default());

        store.insert(Node::new("EC2", "Compute", "", Point::new(1000.0, 400.0)), ROOT_ID).unwrap();
        store.insert(Node::new("Lambda", "Compute", "", Point::new(800.0, 600.0)), ROOT_ID).unwrap();
        store.insert(Node::new("S3", "Storage", "", Point::new(600.0, 400.0)), "EC2").unwrap();
        store.insert(Node::new("Note", "", "", Point::new(800.0, 200.0)), ROOT_ID).unwrap();

        assert_eq!(Stats::compute(&store), Stats { nodes: 4, categories: 2 });
    }
}

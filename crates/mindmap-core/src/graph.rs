//! Graph store using petgraph::StableDiGraph keyed by node id
//!
//! Nodes are authored; edges are derived. The graph's edge set holds only the
//! rendered (non-degenerate) parent → child edges together with their clipped
//! segment, and is kept in sync by [`GraphStore::resync`] after every mutation.

use crate::error::{DiagramError, Result};
use crate::geometry::clip_edge;
use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Outcome of a successful insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Inserted {
    pub id: String,
    pub parent_id: String,
    /// The requested parent did not exist and the root was used instead.
    pub fell_back: bool,
}

/// Outcome of a successful removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub node: Node,
    /// Former children, now attached to the root.
    pub reparented: Vec<String>,
}

/// A rendered edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub segment: EdgeSegment,
}

/// The diagram graph: one protected root plus its descendants.
#[derive(Clone)]
pub struct GraphStore {
    inner: StableDiGraph<Node, EdgeSegment>,
    index: HashMap<String, NodeIndex>,
    /// Insertion order, root first.
    order: Vec<NodeIndex>,
    root: NodeIndex,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl GraphStore {
    /// A store holding only `root`. The root's id, parent and flags are forced.
    pub fn new(mut root: Node) -> Self {
        root.id = ROOT_ID.to_string();
        root.parent_id = None;
        root.is_central = true;

        let mut inner = StableDiGraph::new();
        let idx = inner.add_node(root);
        let mut index = HashMap::new();
        index.insert(ROOT_ID.to_string(), idx);

        GraphStore { inner, index, order: vec![idx], root: idx }
    }

    /// Build a store from a complete node list, root included.
    ///
    /// Exactly one node must carry [`ROOT_ID`]; ids must be unique; every
    /// parent reference must resolve. All edges are computed.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self> {
        let mut nodes = nodes;
        let root_pos = nodes
            .iter()
            .position(Node::is_root)
            .ok_or_else(|| DiagramError::Validation("no root node".to_string()))?;
        let root = nodes.remove(root_pos);
        let mut store = GraphStore::new(root);

        for node in nodes {
            if store.index.contains_key(&node.id) {
                return Err(DiagramError::DuplicateNode(node.id));
            }
            let valid_parent = node.parent_id.as_ref().is_some_and(|p| p != &node.id);
            if !node.is_central && !valid_parent {
                return Err(DiagramError::Validation(format!(
                    "node \"{}\" has no usable parent",
                    node.id
                )));
            }
            let id = node.id.clone();
            let idx = store.inner.add_node(node);
            store.index.insert(id, idx);
            store.order.push(idx);
        }

        let dangling = store
            .all()
            .filter(|n| !n.is_root())
            .find(|n| n.parent_id.as_ref().is_none_or(|p| !store.index.contains_key(p)))
            .map(|n| n.id.clone());
        if let Some(id) = dangling {
            return Err(DiagramError::Validation(format!("node \"{id}\" references a missing parent")));
        }
        if store.all().filter(|n| n.is_central).count() != 1 {
            return Err(DiagramError::Validation("more than one central node".to_string()));
        }

        store.resync_all();
        Ok(store)
    }

    /// Insert `node` under `parent_id`, falling back to the root when the
    /// parent does not exist.
    pub fn insert(&mut self, mut node: Node, parent_id: &str) -> Result<Inserted> {
        if self.index.contains_key(&node.id) {
            return Err(DiagramError::DuplicateNode(node.id));
        }
        if !node.position.is_finite() {
            return Err(DiagramError::Validation(format!(
                "node \"{}\" has a non-finite position",
                node.id
            )));
        }

        let (parent_id, fell_back) = self.resolve_parent(parent_id);
        node.parent_id = Some(parent_id.clone());
        node.is_central = false;

        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id.clone(), idx);
        self.order.push(idx);
        self.resync(&id);

        debug!("Inserted node {} under {}", id, parent_id);
        Ok(Inserted { id, parent_id, fell_back })
    }

    /// Resolve a requested parent id to an existing node id, or the root.
    pub fn resolve_parent(&self, parent_id: &str) -> (String, bool) {
        if self.index.contains_key(parent_id) {
            (parent_id.to_string(), false)
        } else {
            warn!("Parent node \"{}\" not found, attaching to root", parent_id);
            (ROOT_ID.to_string(), true)
        }
    }

    /// Remove a non-root node, reparenting its children to the root.
    pub fn remove(&mut self, id: &str) -> Result<Removed> {
        if id == ROOT_ID {
            return Err(DiagramError::ProtectedNode(id.to_string()));
        }
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| DiagramError::UnknownNode(id.to_string()))?;

        let reparented: Vec<String> = self.children_of(id).map(|n| n.id.clone()).collect();

        // Incident edges go with the node.
        let node = self
            .inner
            .remove_node(idx)
            .ok_or_else(|| DiagramError::UnknownNode(id.to_string()))?;
        self.index.remove(id);
        self.order.retain(|&i| i != idx);

        for child in &reparented {
            if let Some(n) = self.node_mut(child) {
                n.parent_id = Some(ROOT_ID.to_string());
            }
            self.resync(child);
        }

        debug!("Removed node {} ({} children reparented)", id, reparented.len());
        Ok(Removed { node, reparented })
    }

    /// Remove everything except the root.
    pub fn clear(&mut self) {
        let root = self.root().clone();
        *self = GraphStore::new(root);
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.inner[self.root]
    }

    /// All nodes in insertion order, root first.
    pub fn all(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(move |&idx| self.inner.node_weight(idx))
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    /// True when only the root remains.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Nodes whose parent is `id`.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.all()
            .filter(move |n| n.id != id && n.parent_id.as_deref() == Some(id))
    }

    /// Move a node and resync its edges. Non-finite targets are ignored.
    pub fn move_node(&mut self, id: &str, to: Point) -> Result<()> {
        if !to.is_finite() {
            warn!("Ignoring non-finite move of {}", id);
            return Ok(());
        }
        let node = self
            .node_mut(id)
            .ok_or_else(|| DiagramError::UnknownNode(id.to_string()))?;
        node.position = to;
        self.resync(id);
        Ok(())
    }

    /// Recompute the rendered edges touching `id`: its parent edge and the
    /// edges to each of its children.
    pub fn resync(&mut self, id: &str) {
        let Some(&idx) = self.index.get(id) else {
            return;
        };

        let incident: Vec<_> = self
            .inner
            .edges_directed(idx, Direction::Incoming)
            .chain(self.inner.edges_directed(idx, Direction::Outgoing))
            .map(|e| e.id())
            .collect();
        for edge in incident {
            self.inner.remove_edge(edge);
        }

        if let Some(parent) = self.inner[idx].parent_id.clone() {
            if let Some(&parent_idx) = self.index.get(&parent) {
                self.link(parent_idx, idx);
            }
        }

        let children: Vec<NodeIndex> = self
            .children_of(id)
            .filter_map(|n| self.index.get(&n.id).copied())
            .collect();
        for child in children {
            self.link(idx, child);
        }
    }

    /// Drop and recompute every rendered edge.
    pub fn resync_all(&mut self) {
        self.inner.clear_edges();
        let pairs: Vec<(NodeIndex, NodeIndex)> = self
            .order
            .iter()
            .filter_map(|&idx| {
                let parent = self.inner[idx].parent_id.as_ref()?;
                let parent_idx = *self.index.get(parent)?;
                Some((parent_idx, idx))
            })
            .collect();
        for (parent, child) in pairs {
            self.link(parent, child);
        }
    }

    /// Add the edge `source → target` unless it is a self-loop or degenerate.
    fn link(&mut self, source: NodeIndex, target: NodeIndex) {
        if source == target {
            return;
        }
        if let Some(segment) = clip_edge(&self.inner[source], &self.inner[target]) {
            self.inner.add_edge(source, target, segment);
        }
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.index.get(id)?;
        self.inner.node_weight_mut(idx)
    }

    /// Total number of rendered edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over the rendered edges.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.inner.edge_references().map(move |e| EdgeView {
            source: &self.inner[e.source()].id,
            target: &self.inner[e.target()].id,
            segment: *e.weight(),
        })
    }

    /// The rendered segment of `source → target`, if drawn.
    pub fn edge(&self, source: &str, target: &str) -> Option<EdgeSegment> {
        let (&s, &t) = (self.index.get(source)?, self.index.get(target)?);
        let edge = self.inner.find_edge(s, t)?;
        self.inner.edge_weight(edge).copied()
    }

    /// Topmost node whose footprint contains `point` (latest insertion wins).
    pub fn hit_test(&self, point: Point) -> Option<&Node> {
        self.order
            .iter()
            .rev()
            .filter_map(|&idx| self.inner.node_weight(idx))
            .find(|n| crate::geometry::Footprint::of(n).contains(n.position, point))
    }
}

//! Save/load of the diagram as a JSON document
//!
//! The document carries every node plus the viewport. Edges are not stored;
//! they follow from the parent links and are recomputed on load.

use crate::error::{DiagramError, Result};
use crate::graph::GraphStore;
use crate::model::*;
use crate::viewport::INITIAL_CENTER;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// One node as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub parent_id: Option<String>,
    pub is_central: bool,
    pub is_custom: bool,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        NodeRecord {
            id: node.id.clone(),
            name: node.label.clone(),
            category: node.category.clone(),
            description: node.description.clone(),
            x: node.position.x,
            y: node.position.y,
            parent_id: node.parent_id.clone(),
            is_central: node.is_central,
            is_custom: node.is_custom,
        }
    }
}

/// The persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<NodeRecord>,
    #[serde(default, alias = "viewBox", skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Rect>,
}

/// Every node plus the viewport at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub viewport: Option<Rect>,
}

impl GraphSnapshot {
    pub fn of(store: &GraphStore, viewport: Rect) -> Self {
        GraphSnapshot { nodes: store.all().cloned().collect(), viewport: Some(viewport) }
    }
}

/// A validated snapshot plus the repairs made while reading it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub snapshot: GraphSnapshot,
    pub warnings: Vec<String>,
}

/// Values used to fill gaps in a loaded document.
#[derive(Debug, Clone)]
pub struct LoadDefaults {
    pub root_label: String,
    pub center: Point,
}

impl Default for LoadDefaults {
    fn default() -> Self {
        LoadDefaults { root_label: DEFAULT_ROOT_LABEL.to_string(), center: INITIAL_CENTER }
    }
}

/// Produce the document for the current store and viewport.
pub fn serialize(store: &GraphStore, viewport: Rect) -> Document {
    Document {
        nodes: store.all().map(NodeRecord::from).collect(),
        viewport: Some(viewport),
    }
}

/// Validate and decode a document with default gap-filling values.
pub fn deserialize(value: &Value) -> Result<Loaded> {
    deserialize_with(value, &LoadDefaults::default())
}

/// Validate and decode a document.
///
/// Structural problems abort with [`DiagramError::Validation`]; per-record
/// problems are repaired and reported in [`Loaded::warnings`].
pub fn deserialize_with(value: &Value, defaults: &LoadDefaults) -> Result<Loaded> {
    let doc = value
        .as_object()
        .ok_or_else(|| invalid("document must be a JSON object"))?;
    let records = doc
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("`nodes` must be an array"))?;

    if let Some(first) = records.first() {
        let first = first.as_object().ok_or_else(|| invalid("node records must be objects"))?;
        let missing: Vec<&str> = ["id", "name", "x", "y"]
            .into_iter()
            .filter(|key| first.get(*key).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(invalid(&format!("first node is missing {}", missing.join(", "))));
        }
    }

    let mut warnings = Vec::new();
    let mut nodes: Vec<Node> = Vec::with_capacity(records.len() + 1);
    let mut seen = HashSet::new();
    let mut has_root = false;

    for (i, record) in records.iter().enumerate() {
        let Some(record) = record.as_object() else {
            warnings.push(format!("record {i} is not an object and was skipped"));
            continue;
        };
        let Some(id) = text_field(record, "id") else {
            warnings.push(format!("record {i} has no id and was skipped"));
            continue;
        };
        if !seen.insert(id.clone()) {
            warnings.push(format!("duplicate node \"{id}\" was dropped"));
            continue;
        }

        let mut node = decode_node(record, id, defaults);
        if node.id == ROOT_ID {
            node.is_central = true;
            node.parent_id = None;
            has_root = true;
        } else if node.is_central {
            warnings.push(format!("node \"{}\" claimed to be the root and was demoted", node.id));
            node.is_central = false;
        }
        nodes.push(node);
    }

    if !has_root {
        warnings.push("document had no root node; a new one was created".to_string());
        nodes.insert(0, Node::root(defaults.root_label.clone(), defaults.center));
        seen.insert(ROOT_ID.to_string());
    }

    for node in nodes.iter_mut().filter(|n| !n.is_central) {
        let usable = node
            .parent_id
            .as_ref()
            .is_some_and(|p| p != &node.id && seen.contains(p));
        if !usable {
            if let Some(parent) = &node.parent_id {
                warnings.push(format!(
                    "node \"{}\" referenced unknown parent \"{parent}\" and was attached to the root",
                    node.id
                ));
            }
            node.parent_id = Some(ROOT_ID.to_string());
        }
    }

    let viewport = match doc.get("viewport").or_else(|| doc.get("viewBox")) {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value::<Rect>(v.clone()) {
            Ok(rect) if rect.is_finite() && rect.width > 0.0 && rect.height > 0.0 => Some(rect),
            _ => {
                warnings.push("viewport was invalid and will be reset".to_string());
                None
            }
        },
    };

    for w in &warnings {
        warn!("{}", w);
    }
    debug!("Decoded document with {} nodes", nodes.len());
    Ok(Loaded { snapshot: GraphSnapshot { nodes, viewport }, warnings })
}

fn decode_node(record: &Map<String, Value>, id: String, defaults: &LoadDefaults) -> Node {
    let is_central = record.get("isCentral").and_then(Value::as_bool).unwrap_or(false);
    let label = text_field(record, "name").unwrap_or_else(|| id.clone());
    let category = text_field(record, "category").unwrap_or_else(|| {
        if is_central || id == ROOT_ID { ROOT_CATEGORY } else { FALLBACK_CATEGORY }.to_string()
    });
    Node {
        label,
        category,
        description: text_field(record, "description").unwrap_or_default(),
        position: Point::new(
            number_field(record, "x").unwrap_or(defaults.center.x),
            number_field(record, "y").unwrap_or(defaults.center.y),
        ),
        parent_id: text_field(record, "parentId"),
        is_central,
        is_custom: record.get("isCustom").and_then(Value::as_bool).unwrap_or(false),
        id,
    }
}

/// Non-empty string (numbers are accepted and stringified).
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number, from a JSON number or a numeric string.
fn number_field(record: &Map<String, Value>, key: &str) -> Option<f64> {
    let n = match record.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn invalid(msg: &str) -> DiagramError {
    DiagramError::Validation(msg.to_string())
}

/// Parse and validate a document from JSON text.
pub fn from_json_str(json: &str) -> Result<Loaded> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| DiagramError::Validation(format!("not valid JSON: {e}")))?;
    deserialize(&value)
}

pub fn to_json_string(doc: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Dated file name for a saved document.
pub fn document_file_name(date: NaiveDate) -> String {
    format!("mindmap-state-{}.json", date.format("%Y%m%d"))
}

/// Write a document to disk, creating parent directories as needed.
pub fn save_document(doc: &Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, to_json_string(doc)?)?;
    debug!("Document saved: {}", path.display());
    Ok(())
}

/// Read and validate a document from disk.
pub fn load_document(path: &Path) -> Result<Loaded> {
    let json = std::fs::read_to_string(path)?;
    let loaded = from_json_str(&json)?;
    debug!("Document loaded from: {}", path.display());
    Ok(loaded)
}

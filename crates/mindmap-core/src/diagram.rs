//! The editing session: one diagram with its viewport, pointer and selection
//!
//! Every user action goes through [`Diagram`] and returns a [`Notice`]
//! describing its outcome. Actions that need a confirmation take a callback
//! and return `None` when it declines.

use crate::asset::RootVisual;
use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{DiagramError, Result};
use crate::graph::{GraphStore, Inserted};
use crate::interaction::{Effect, HitTarget, InteractionController, PointerEvent, PointerInput};
use crate::model::*;
use crate::persistence::{self, Document, LoadDefaults, Loaded};
use crate::placement::PlacementEngine;
use crate::scene::Scene;
use crate::selection::Selection;
use crate::stats::Stats;
use crate::viewport::{Viewport, INITIAL_VIEW};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Description given to catalog entries that have none.
pub const DEFAULT_ENTRY_DESCRIPTION: &str = "Catalog service";
/// Description given to custom nodes that have none.
pub const DEFAULT_CUSTOM_DESCRIPTION: &str = "Custom node";

/// Construction parameters for a [`Diagram`].
#[derive(Debug, Clone)]
pub struct DiagramOptions {
    pub root_label: String,
    /// Fixed placement seed; `None` draws from entropy.
    pub seed: Option<u64>,
    pub screen: Size,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        DiagramOptions {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            seed: None,
            screen: Size::new(INITIAL_VIEW.width, INITIAL_VIEW.height),
        }
    }
}

#[derive(Debug)]
pub struct Diagram {
    store: GraphStore,
    placer: PlacementEngine,
    viewport: Viewport,
    pointer: InteractionController,
    selection: Selection,
    catalog: Catalog,
    visual: RootVisual,
    root_label: String,
}

impl Diagram {
    pub fn new(catalog: Catalog, visual: RootVisual, options: DiagramOptions) -> Self {
        let placer = match options.seed {
            Some(seed) => PlacementEngine::seeded(seed),
            None => PlacementEngine::new(),
        };
        Self::with_placer(catalog, visual, options, placer)
    }

    /// Build a session around a caller-supplied placement engine.
    pub fn with_placer(
        catalog: Catalog,
        visual: RootVisual,
        options: DiagramOptions,
        placer: PlacementEngine,
    ) -> Self {
        let viewport = Viewport::new(INITIAL_VIEW, options.screen);
        let root = Node::root(options.root_label.clone(), INITIAL_VIEW.center());
        Diagram {
            store: GraphStore::new(root),
            placer,
            viewport,
            pointer: InteractionController::new(),
            selection: Selection::new(),
            catalog,
            visual,
            root_label: options.root_label,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn root_visual(&self) -> &RootVisual {
        &self.visual
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.pointer
    }

    /// Split borrow for exporting: the store and visual are read while the
    /// viewport is temporarily reconfigured.
    pub fn export_parts(&mut self) -> (&GraphStore, &mut Viewport, &RootVisual) {
        (&self.store, &mut self.viewport, &self.visual)
    }

    pub fn stats(&self) -> Stats {
        Stats::compute(&self.store)
    }

    pub fn scene(&self) -> Scene {
        Scene::build(&self.store, &self.viewport, self.selection.current(), &self.visual)
    }

    // ---- adding nodes ----------------------------------------------------

    /// Add one catalog entry under the selected node.
    pub fn add_entry(&mut self, service: &str) -> Notice {
        if self.store.contains(service) {
            return Notice::warning(format!("\"{service}\" is already on the map"));
        }
        let Some(entry) = self.catalog.find(service).cloned() else {
            return Notice::warning(format!("\"{service}\" is not in the catalog"));
        };
        match self.add_node(entry, false) {
            Ok(_) => Notice::success(format!("\"{service}\" added")),
            Err(e) => Notice::from(&e),
        }
    }

    /// Add every entry of a category that is not on the map yet.
    /// `input` is a category name fragment or a 1-based category number.
    pub fn add_category(&mut self, input: &str) -> Notice {
        let Some(category) = self.catalog.resolve_category(input).map(str::to_string) else {
            return Notice::error(format!("Category \"{}\" not found", input.trim()));
        };
        let pending: Vec<CatalogEntry> = self
            .catalog
            .in_category(&category)
            .filter(|e| !self.store.contains(&e.service))
            .cloned()
            .collect();

        let mut added = 0;
        for entry in pending {
            match self.add_node(entry, false) {
                Ok(_) => added += 1,
                Err(e) => warn!("Skipping catalog entry: {}", e),
            }
        }

        if added > 0 {
            info!("Added {} entries from category {}", added, category);
            Notice::success(format!("{added} entries from \"{category}\" added"))
        } else {
            Notice::warning(format!("No new entries from \"{category}\" to add"))
        }
    }

    /// Add a user-defined node under the selected node.
    pub fn add_custom(&mut self, name: &str, category: &str, description: &str) -> Notice {
        let name = name.trim();
        let category = category.trim();
        if name.is_empty() {
            return Notice::warning("Node name cannot be empty");
        }
        if category.is_empty() {
            return Notice::warning("Category cannot be empty");
        }
        if self.store.contains(name) {
            return Notice::from(&DiagramError::DuplicateNode(name.to_string()));
        }
        let entry = CatalogEntry::new(name, category, description.trim());
        match self.add_node(entry, true) {
            Ok(_) => Notice::success(format!("Custom node \"{name}\" added")),
            Err(e) => Notice::from(&e),
        }
    }

    fn add_node(&mut self, entry: CatalogEntry, is_custom: bool) -> Result<Inserted> {
        let (parent_id, _) = self.store.resolve_parent(self.selection.insertion_parent());
        let parent = self
            .store
            .get(&parent_id)
            .ok_or_else(|| DiagramError::UnknownNode(parent_id.clone()))?;
        let siblings = self.store.children_of(&parent_id).count();
        let position = self.placer.place(parent, siblings);

        let category = if entry.category.trim().is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            entry.category
        };
        let description = match (entry.description.is_empty(), is_custom) {
            (false, _) => entry.description,
            (true, true) => DEFAULT_CUSTOM_DESCRIPTION.to_string(),
            (true, false) => DEFAULT_ENTRY_DESCRIPTION.to_string(),
        };
        let mut node = Node::new(entry.service, category, description, position);
        node.is_custom = is_custom;

        let inserted = self.store.insert(node, &parent_id)?;
        info!("Added node {} under {}", inserted.id, inserted.parent_id);
        Ok(inserted)
    }

    // ---- selection and removal ------------------------------------------

    pub fn select(&mut self, id: &str) -> Notice {
        match self.store.get(id) {
            Some(node) => {
                let label = node.label.clone();
                self.selection.select(id);
                Notice::success(format!("\"{label}\" selected"))
            }
            None => Notice::from(&DiagramError::UnknownNode(id.to_string())),
        }
    }

    /// Delete the selected node after `confirm` accepts it. Its children move
    /// to the root and the root becomes selected.
    pub fn delete_selected(&mut self, confirm: impl FnOnce(&Node) -> bool) -> Option<Notice> {
        let Some(id) = self.selection.current().map(str::to_string) else {
            return Some(Notice::warning("No node selected"));
        };
        if id == ROOT_ID {
            return Some(Notice::from(&DiagramError::ProtectedNode(self.store.root().label.clone())));
        }
        let Some(node) = self.store.get(&id) else {
            self.selection.reset_to_root();
            return Some(Notice::from(&DiagramError::UnknownNode(id)));
        };
        if !confirm(node) {
            debug!("Deletion of {} declined", id);
            return None;
        }

        let notice = match self.store.remove(&id) {
            Ok(removed) if removed.reparented.is_empty() => {
                Notice::success(format!("\"{}\" removed", removed.node.label))
            }
            Ok(removed) => Notice::success(format!(
                "\"{}\" removed; {} child node(s) moved to the root",
                removed.node.label,
                removed.reparented.len()
            )),
            Err(e) => Notice::from(&e),
        };
        info!("Deleted node {}", id);
        self.selection.reset_to_root();
        self.pointer.reset();
        Some(notice)
    }

    /// Remove every node except the root after `confirm` accepts the count of
    /// nodes about to go.
    pub fn clear(&mut self, confirm: impl FnOnce(usize) -> bool) -> Option<Notice> {
        let doomed = self.store.len() - 1;
        if doomed == 0 {
            return Some(Notice::warning("The map only holds the root"));
        }
        if !confirm(doomed) {
            return None;
        }
        self.store.clear();
        self.selection.reset_to_root();
        self.pointer.reset();
        info!("Cleared {} nodes", doomed);
        Some(Notice::success("Map cleared; root kept"))
    }

    // ---- pointer and viewport -------------------------------------------

    /// Feed one pointer event, in screen coordinates, through the state
    /// machine and apply its effect.
    pub fn pointer(&mut self, input: PointerInput) -> Option<Effect> {
        let mut controller = std::mem::take(&mut self.pointer);
        let effect = self.pointer_with(&mut controller, input);
        self.pointer = controller;
        effect
    }

    /// Like [`Diagram::pointer`], but with a caller-owned pointer state, so
    /// several hosts can drag and pan the same diagram independently.
    pub fn pointer_with(
        &mut self,
        controller: &mut InteractionController,
        input: PointerInput,
    ) -> Option<Effect> {
        let event = match input {
            PointerInput::Down { x, y } => {
                let screen = Point::new(x, y);
                let world = self.viewport.to_world(screen);
                let hit = self
                    .store
                    .hit_test(world)
                    .map(|n| HitTarget { id: n.id.clone(), position: n.position });
                PointerEvent::Down { screen, world, hit }
            }
            PointerInput::Move { x, y } => {
                let screen = Point::new(x, y);
                PointerEvent::Move { screen, world: self.viewport.to_world(screen) }
            }
            PointerInput::Up => PointerEvent::Up,
            PointerInput::Leave => PointerEvent::Leave,
        };

        let effect = controller.handle(event)?;
        match &effect {
            Effect::Select(id) => {
                self.selection.select(id.clone());
            }
            Effect::MoveNode { id, to } => {
                if let Err(e) = self.store.move_node(id, *to) {
                    warn!("Drag target vanished: {}", e);
                    controller.reset();
                }
            }
            Effect::Pan { dx, dy } => self.viewport.pan_by(*dx, *dy),
        }
        Some(effect)
    }

    /// One wheel notch at a screen point. Returns the zoom factor applied.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> f64 {
        self.viewport.wheel(Point::new(x, y), delta_y)
    }

    /// Recentre the initial view on the root.
    pub fn reset_view(&mut self) -> Notice {
        self.viewport.reset(self.store.root().position);
        Notice::success("View reset")
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_screen(Size::new(width, height));
    }

    // ---- persistence ----------------------------------------------------

    pub fn document(&self) -> Document {
        persistence::serialize(&self.store, self.viewport.rect())
    }

    pub fn save_json(&self) -> Result<String> {
        persistence::to_json_string(&self.document())
    }

    fn load_defaults(&self) -> LoadDefaults {
        LoadDefaults {
            root_label: self.root_label.clone(),
            center: self.viewport.initial().center(),
        }
    }

    /// Validate a document without touching the session.
    pub fn validate(&self, value: &Value) -> Result<Loaded> {
        let loaded = persistence::deserialize_with(value, &self.load_defaults())?;
        GraphStore::from_nodes(loaded.snapshot.nodes.clone())?;
        Ok(loaded)
    }

    /// Replace the diagram with a document once `confirm` accepts it.
    ///
    /// The document is fully validated first; on error or refusal the
    /// session is unchanged.
    pub fn load(
        &mut self,
        value: &Value,
        confirm: impl FnOnce(&Loaded) -> bool,
    ) -> Result<Option<Notice>> {
        let loaded = persistence::deserialize_with(value, &self.load_defaults())?;
        let store = GraphStore::from_nodes(loaded.snapshot.nodes.clone())?;
        if !confirm(&loaded) {
            debug!("Load declined");
            return Ok(None);
        }
        Ok(Some(self.install(store, &loaded)))
    }

    /// Load a document from JSON text, without confirmation.
    pub fn load_str(&mut self, json: &str) -> Result<Notice> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DiagramError::Validation(format!("not valid JSON: {e}")))?;
        self.load(&value, |_| true)?
            .ok_or_else(|| DiagramError::Validation("load declined".to_string()))
    }

    fn install(&mut self, store: GraphStore, loaded: &Loaded) -> Notice {
        self.store = store;
        match loaded.snapshot.viewport {
            Some(rect) => self.viewport.set_rect(rect),
            None => self.viewport.reset(self.store.root().position),
        }
        self.selection.reset_to_root();
        self.pointer.reset();

        let count = self.store.len();
        info!("Loaded map with {} nodes", count);
        if loaded.warnings.is_empty() {
            Notice::success(format!("Map loaded ({count} nodes)"))
        } else {
            Notice::warning(format!(
                "Map loaded ({count} nodes) with {} repair(s): {}",
                loaded.warnings.len(),
                loaded.warnings.join("; ")
            ))
        }
    }
}

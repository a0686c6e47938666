//! Single-node selection

use crate::model::ROOT_ID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    /// Selection starting on the root.
    pub fn new() -> Self {
        Selection { selected: Some(ROOT_ID.to_string()) }
    }

    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Select `id`, returning the previously selected id.
    pub fn select(&mut self, id: impl Into<String>) -> Option<String> {
        self.selected.replace(id.into())
    }

    pub fn clear(&mut self) -> Option<String> {
        self.selected.take()
    }

    /// Back to the root, as after any bulk structural change.
    pub fn reset_to_root(&mut self) {
        self.selected = Some(ROOT_ID.to_string());
    }

    /// Parent to use for newly added nodes.
    pub fn insertion_parent(&self) -> &str {
        self.selected.as_deref().unwrap_or(ROOT_ID)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

//! # Editor side-state
//!
//! Selection, tree expand/hidden state, edit mode and the lifecycle
//! registry. None of this is part of the document, but structural commands
//! keep it consistent: removing a component purges its entries and undoing
//! the removal restores them exactly.

use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use sitecraft_document::{Component, Site};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditMode {
    #[default]
    Design,
    Preview,
    Code,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    /// Selected component ids in selection order
    pub selection: Vec<String>,
    pub expanded: BTreeSet<String>,
    pub hidden: BTreeSet<String>,
    pub mode: EditMode,
    /// lifecycle event → ids of components listening for it
    pub lifecycle: BTreeMap<String, BTreeSet<String>>,
}

/// Editor entries removed alongside a set of components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookkeeping {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    selection: Vec<(usize, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    expanded: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hidden: Vec<String>,
    /// (event, component id)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lifecycle: Vec<(String, String)>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state with the lifecycle registry rebuilt from the arena
    pub fn from_site(site: &Site) -> Self {
        let mut state = Self::new();
        for component in site.context.components.values() {
            state.register_component(component);
        }
        state
    }

    pub fn select(&mut self, id: &str) -> EditorResult<()> {
        if self.is_selected(id) {
            return Err(EditorError::AlreadySelected(id.to_string()));
        }
        self.selection.push(id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.selection.len();
        self.selection.retain(|s| s != id);
        before != self.selection.len()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(id.to_string());
        } else {
            self.expanded.remove(id);
        }
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        if hidden {
            self.hidden.insert(id.to_string());
        } else {
            self.hidden.remove(id);
        }
    }

    pub fn register(&mut self, event: &str, id: &str) {
        self.lifecycle
            .entry(event.to_string())
            .or_default()
            .insert(id.to_string());
    }

    pub fn unregister(&mut self, event: &str, id: &str) {
        if let Some(ids) = self.lifecycle.get_mut(event) {
            ids.remove(id);
            if ids.is_empty() {
                self.lifecycle.remove(event);
            }
        }
    }

    /// Register every non-empty editor event slot of `component`
    pub fn register_component(&mut self, component: &Component) {
        for (event, behaviors) in &component.editor_events {
            if !behaviors.is_empty() {
                self.register(event, &component.id);
            }
        }
    }

    pub fn listeners(&self, event: &str) -> Vec<String> {
        self.lifecycle
            .get(event)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every entry referring to `ids`, returning what was dropped
    pub(crate) fn purge(&mut self, ids: &[String]) -> Bookkeeping {
        let doomed: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        let mut purged = Bookkeeping::default();

        purged.selection = self
            .selection
            .iter()
            .enumerate()
            .filter(|(_, id)| doomed.contains(id.as_str()))
            .map(|(index, id)| (index, id.clone()))
            .collect();
        self.selection.retain(|id| !doomed.contains(id.as_str()));

        for id in ids {
            if self.expanded.remove(id) {
                purged.expanded.push(id.clone());
            }
            if self.hidden.remove(id) {
                purged.hidden.push(id.clone());
            }
        }

        for (event, listeners) in &self.lifecycle {
            for id in listeners.iter().filter(|id| doomed.contains(id.as_str())) {
                purged.lifecycle.push((event.clone(), id.clone()));
            }
        }
        for (event, id) in &purged.lifecycle {
            self.unregister(event, id);
        }

        purged
    }

    pub(crate) fn restore(&mut self, purged: &Bookkeeping) {
        for (index, id) in &purged.selection {
            let at = (*index).min(self.selection.len());
            self.selection.insert(at, id.clone());
        }
        self.expanded.extend(purged.expanded.iter().cloned());
        self.hidden.extend(purged.hidden.iter().cloned());
        for (event, id) in &purged.lifecycle {
            self.register(event, id);
        }
    }
}

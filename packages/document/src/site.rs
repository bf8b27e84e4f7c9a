use crate::component::Component;
use crate::id_generator::{IdAllocator, IdKind};
use crate::style::{Behavior, Breakpoint, Style, Theme};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Current document schema version
pub const SCHEMA_VERSION: &str = "3";

/// Root document aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Schema version tag, advanced by migrations
    pub version: String,
    pub context: Context,
    #[serde(default)]
    pub pages: BTreeMap<String, Page>,
    /// Routes in display order
    #[serde(default)]
    pub page_order: Vec<String>,
    #[serde(default)]
    pub defaults: Defaults,
}

/// Global document state shared by every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// `namespace` and `nextId`
    #[serde(flatten)]
    pub ids: IdAllocator,

    /// Owning arena for every component in every page
    #[serde(default)]
    pub components: BTreeMap<String, Component>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, Style>,

    /// Cascade precedence; later entries win
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_order: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: BTreeMap<String, Breakpoint>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub behaviors: BTreeMap<String, Behavior>,

    #[serde(default, skip_serializing_if = "Theme::is_empty")]
    pub theme: Theme,

    /// locale → key → text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub i18n: BTreeMap<String, BTreeMap<String, String>>,

    /// Components usable as reusable templates
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub custom_component_ids: BTreeSet<String>,

    /// Descendants of template instances
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub custom_child_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub head: BTreeMap<String, HeadTag>,
    /// Id of the owned root component
    pub root: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub head: BTreeMap<String, HeadTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
}

/// An element emitted into a page `<head>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadTag {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl HeadTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            content: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is_well_formed(&self) -> bool {
        !self.tag.trim().is_empty()
    }
}

impl Site {
    /// Create a site with a single home page at `/`
    pub fn new(namespace: impl Into<String>) -> Self {
        let mut site = Self::empty(namespace);
        let root = site.context.ids.new_id(IdKind::Component);
        site.context
            .components
            .insert(root.clone(), Component::new(root.clone(), "body"));
        site.pages.insert(
            "/".to_string(),
            Page {
                name: "Home".to_string(),
                public: true,
                head: BTreeMap::new(),
                root,
            },
        );
        site.page_order.push("/".to_string());
        site.defaults.home_page = Some("/".to_string());
        site
    }

    /// Create a site without pages (only useful as a deserialization or test base)
    pub fn empty(namespace: impl Into<String>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            context: Context::new(namespace),
            pages: BTreeMap::new(),
            page_order: Vec::new(),
            defaults: Defaults::default(),
        }
    }

    pub fn page(&self, route: &str) -> Option<&Page> {
        self.pages.get(route)
    }

    pub fn page_mut(&mut self, route: &str) -> Option<&mut Page> {
        self.pages.get_mut(route)
    }

    pub fn home_page(&self) -> Option<&str> {
        self.defaults.home_page.as_deref()
    }

    /// Root component of the page at `route`
    pub fn page_root(&self, route: &str) -> Option<&Component> {
        self.pages
            .get(route)
            .and_then(|page| self.context.components.get(&page.root))
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.context.components.get(id)
    }

    pub fn component_count(&self) -> usize {
        self.context.components.len()
    }
}

impl Context {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            ids: IdAllocator::new(namespace),
            components: BTreeMap::new(),
            styles: BTreeMap::new(),
            style_order: Vec::new(),
            breakpoints: BTreeMap::new(),
            behaviors: BTreeMap::new(),
            theme: Theme::default(),
            i18n: BTreeMap::new(),
            custom_component_ids: BTreeSet::new(),
            custom_child_ids: BTreeSet::new(),
        }
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// `id` and all of its descendants in pre-order. Empty if `id` is unknown.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];

        while let Some(next) = stack.pop() {
            if let Some(component) = self.components.get(&next) {
                stack.extend(component.children.iter().rev().cloned());
                out.push(next);
            }
        }

        out
    }

    pub fn subtree_len(&self, id: &str) -> usize {
        self.descendants(id).len()
    }

    /// True when `ancestor` is `id` or lies on its parent chain
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self
                .components
                .get(current)
                .and_then(|c| c.parent.as_deref());
        }
        false
    }

    /// Parent id and index of `id` within the parent's children
    pub fn position_of(&self, id: &str) -> Option<(String, usize)> {
        let parent_id = self.components.get(id)?.parent.clone()?;
        let index = self
            .components
            .get(&parent_id)?
            .children
            .iter()
            .position(|c| c == id)?;
        Some((parent_id, index))
    }

    /// Unsplice `id` from its parent; returns the former position
    pub fn detach(&mut self, id: &str) -> Option<(String, usize)> {
        let (parent_id, index) = self.position_of(id)?;
        if let Some(parent) = self.components.get_mut(&parent_id) {
            parent.children.remove(index);
        }
        if let Some(component) = self.components.get_mut(id) {
            component.parent = None;
        }
        Some((parent_id, index))
    }

    /// Splice `id` into `parent_id` at `index` (clamped), or append when
    /// `index` is `None`. Returns the index actually used.
    pub fn attach(&mut self, id: &str, parent_id: &str, index: Option<usize>) -> Option<usize> {
        if !self.components.contains_key(id) {
            return None;
        }
        let parent = self.components.get_mut(parent_id)?;
        let at = index
            .unwrap_or(parent.children.len())
            .min(parent.children.len());
        parent.children.insert(at, id.to_string());

        if let Some(component) = self.components.get_mut(id) {
            component.parent = Some(parent_id.to_string());
        }
        Some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Site {
        let mut site = Site::new("t");
        let root = site.pages["/"].root.clone();
        for tag in ["header", "main"] {
            let id = site.context.ids.new_id(IdKind::Component);
            site.context
                .components
                .insert(id.clone(), Component::new(id.clone(), tag));
            site.context.attach(&id, &root, None);
        }
        site
    }

    #[test]
    fn test_new_site_has_home_page() {
        let site = Site::new("site");
        assert_eq!(site.home_page(), Some("/"));
        assert_eq!(site.page_order, vec!["/"]);
        assert_eq!(site.component_count(), 1);
        assert_eq!(site.page_root("/").unwrap().tag, "body");
        assert_eq!(site.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_descendants_pre_order() {
        let site = tree();
        let root = site.pages["/"].root.clone();
        let ids = site.context.descendants(&root);
        assert_eq!(ids, vec!["c-t-1", "c-t-2", "c-t-3"]);
        assert!(site.context.descendants("missing").is_empty());
    }

    #[test]
    fn test_detach_and_attach_keep_back_references() {
        let mut site = tree();
        let root = site.pages["/"].root.clone();

        let (parent, index) = site.context.detach("c-t-2").unwrap();
        assert_eq!(parent, root);
        assert_eq!(index, 0);
        assert!(site.component("c-t-2").unwrap().parent.is_none());
        assert_eq!(site.component(&root).unwrap().children, vec!["c-t-3"]);

        let at = site.context.attach("c-t-2", "c-t-3", Some(99)).unwrap();
        assert_eq!(at, 0);
        assert_eq!(site.component("c-t-2").unwrap().parent.as_deref(), Some("c-t-3"));
        assert!(site.context.is_ancestor(&root, "c-t-2"));
        assert!(!site.context.is_ancestor("c-t-2", "c-t-3"));
    }
}

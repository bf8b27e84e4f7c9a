//! Page commands
//!
//! A site always keeps at least one page, and `defaults.home_page` always
//! names an existing route while any page exists.

use super::component::{restore_nodes, take_nodes, DetachedNodes};
use crate::command_trait::CommandOp;
use crate::dispatch::CommandContext;
use crate::errors::{EditorError, EditorResult};
use crate::hooks::{self, LifecycleEvent};
use serde::{Deserialize, Serialize};
use sitecraft_document::{Component, HeadTag, IdKind, Page, Site};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPage {
    pub route: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub head: BTreeMap<String, HeadTag>,
    pub root_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Root component minted by the last apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default)]
    pub became_home: bool,
}

impl AddPage {
    pub fn new(route: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            name: name.into(),
            public: true,
            head: BTreeMap::new(),
            root_tag: "body".to_string(),
            index: None,
            created: None,
            became_home: false,
        }
    }
}

impl CommandOp for AddPage {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.created = None;
        self.became_home = false;
        if cx.site.pages.contains_key(&self.route) {
            warn!(route = %self.route, "Page route already exists");
            return Ok(());
        }

        let site = &mut *cx.site;
        let root = site.context.ids.new_id(IdKind::Component);
        site.context
            .components
            .insert(root.clone(), Component::new(root.clone(), self.root_tag.clone()));
        site.pages.insert(
            self.route.clone(),
            Page {
                name: self.name.clone(),
                public: self.public,
                head: self.head.clone(),
                root: root.clone(),
            },
        );
        let at = self
            .index
            .unwrap_or(site.page_order.len())
            .min(site.page_order.len());
        site.page_order.insert(at, self.route.clone());
        if site.defaults.home_page.is_none() {
            site.defaults.home_page = Some(self.route.clone());
            self.became_home = true;
        }
        self.created = Some(root);

        hooks::fire_lifecycle(cx, LifecycleEvent::PageAdded);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(root) = self.created.clone() else {
            return Ok(());
        };
        take_nodes(cx, &root);

        let site = &mut *cx.site;
        site.pages.remove(&self.route);
        site.page_order.retain(|r| r != &self.route);
        if self.became_home {
            site.defaults.home_page = None;
        }
        site.context.ids.release(1);
        Ok(())
    }
}

/// Editable page attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub route: String,
    pub name: String,
    pub public: bool,
}

/// Rename a page, change its route or toggle visibility. The root component
/// follows the page to its new route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPage {
    pub old: PageMeta,
    pub new: PageMeta,
    #[serde(default)]
    pub applied: bool,
}

impl EditPage {
    pub fn capture(site: &Site, route: &str, new: PageMeta) -> Option<Self> {
        let page = site.page(route)?;
        Some(Self {
            old: PageMeta {
                route: route.to_string(),
                name: page.name.clone(),
                public: page.public,
            },
            new,
            applied: false,
        })
    }

    fn run(site: &mut Site, from: &PageMeta, to: &PageMeta) -> bool {
        if from.route != to.route && site.pages.contains_key(&to.route) {
            warn!(from = %from.route, to = %to.route, "Page route already taken");
            return false;
        }
        let Some(mut page) = site.pages.remove(&from.route) else {
            return false;
        };
        page.name = to.name.clone();
        page.public = to.public;
        site.pages.insert(to.route.clone(), page);

        if from.route != to.route {
            for route in site.page_order.iter_mut().filter(|r| **r == from.route) {
                *route = to.route.clone();
            }
            if site.defaults.home_page.as_deref() == Some(from.route.as_str()) {
                site.defaults.home_page = Some(to.route.clone());
            }
        }
        true
    }
}

impl CommandOp for EditPage {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.applied = Self::run(cx.site, &self.old, &self.new);
        if self.applied {
            hooks::fire_lifecycle(cx, LifecycleEvent::PageChanged);
        }
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if self.applied {
            Self::run(cx.site, &self.new, &self.old);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedPage {
    pub page: Page,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub detached: DetachedNodes,
    #[serde(default)]
    pub was_home: bool,
}

/// Remove a page and every component it owns. Removing the last page fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePage {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<RemovedPage>,
}

impl RemovePage {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            removed: None,
        }
    }
}

impl CommandOp for RemovePage {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.removed = None;
        if !cx.site.pages.contains_key(&self.route) {
            return Ok(());
        }
        if cx.site.pages.len() == 1 {
            return Err(EditorError::LastPage(self.route.clone()));
        }

        let Some(page) = cx.site.pages.remove(&self.route) else {
            return Ok(());
        };
        let detached = take_nodes(cx, &page.root);

        let site = &mut *cx.site;
        let index = site.page_order.iter().position(|r| r == &self.route);
        if let Some(at) = index {
            site.page_order.remove(at);
        }
        let was_home = site.defaults.home_page.as_deref() == Some(self.route.as_str());
        if was_home {
            let next = site
                .page_order
                .first()
                .or_else(|| site.pages.keys().next())
                .cloned();
            debug!(route = %self.route, next = ?next, "Reassigning home page");
            site.defaults.home_page = next;
        }

        self.removed = Some(RemovedPage {
            page,
            index,
            detached,
            was_home,
        });
        hooks::fire_lifecycle(cx, LifecycleEvent::PageRemoved);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(removed) = &self.removed else {
            return Ok(());
        };
        restore_nodes(cx, &removed.detached);

        let site = &mut *cx.site;
        site.pages.insert(self.route.clone(), removed.page.clone());
        if let Some(index) = removed.index {
            let at = index.min(site.page_order.len());
            site.page_order.insert(at, self.route.clone());
        }
        if removed.was_home {
            site.defaults.home_page = Some(self.route.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetHomePage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    pub new: String,
}

impl SetHomePage {
    pub fn to(site: &Site, route: impl Into<String>) -> Self {
        Self {
            old: site.defaults.home_page.clone(),
            new: route.into(),
        }
    }
}

impl CommandOp for SetHomePage {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if !cx.site.pages.contains_key(&self.new) {
            return Err(EditorError::PageNotFound(self.new.clone()));
        }
        cx.site.defaults.home_page = Some(self.new.clone());
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        cx.site.defaults.home_page = self.old.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NoopHooks;

    #[test]
    fn test_add_page_round_trip() {
        let mut site = Site::new("t");
        let before = site.clone();
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let mut add = AddPage::new("/about", "About");
        add.apply(&mut cx).unwrap();
        assert_eq!(cx.site.page_order, vec!["/", "/about"]);
        assert_eq!(cx.site.pages["/about"].root, "c-t-2");

        add.undo(&mut cx).unwrap();
        assert_eq!(*cx.site, before);
    }

    #[test]
    fn test_duplicate_route_is_ignored() {
        let mut site = Site::new("t");
        let before = site.clone();
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let mut add = AddPage::new("/", "Again");
        add.apply(&mut cx).unwrap();
        assert!(add.created.is_none());
        add.undo(&mut cx).unwrap();
        assert_eq!(*cx.site, before);
    }

    #[test]
    fn test_route_rename_moves_home_page() {
        let mut site = Site::new("t");
        let root = site.pages["/"].root.clone();
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let target = PageMeta {
            route: "/home".to_string(),
            name: "Start".to_string(),
            public: false,
        };
        let mut edit = EditPage::capture(cx.site, "/", target).unwrap();
        edit.apply(&mut cx).unwrap();
        assert_eq!(cx.site.home_page(), Some("/home"));
        assert_eq!(cx.site.page_order, vec!["/home"]);
        assert_eq!(cx.site.pages["/home"].root, root);

        edit.undo(&mut cx).unwrap();
        assert_eq!(cx.site.home_page(), Some("/"));
        assert_eq!(cx.site.pages["/"].name, "Home");
    }

    #[test]
    fn test_removing_last_page_fails() {
        let mut site = Site::new("t");
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let result = RemovePage::new("/").apply(&mut cx);
        assert!(matches!(result, Err(EditorError::LastPage(route)) if route == "/"));
        assert!(cx.site.pages.contains_key("/"));
    }

    #[test]
    fn test_set_home_page_requires_existing_route() {
        let mut site = Site::new("t");
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let mut command = SetHomePage::to(cx.site, "/missing");
        assert!(matches!(
            command.apply(&mut cx),
            Err(EditorError::PageNotFound(_))
        ));
    }
}

//! Style commands: per-component rules, mixin attachment, the mixin
//! table with its precedence order, and breakpoints.

use crate::change::{apply_style_entry, Change, Direction, Entry};
use crate::command_trait::CommandOp;
use crate::dispatch::CommandContext;
use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use sitecraft_document::{Breakpoint, BreakpointStyles, IdKind, Site, Style};
use tracing::debug;

fn style_value(styles: &BreakpointStyles, breakpoint: &str, pseudo: &str, property: &str) -> Option<String> {
    styles.get(breakpoint)?.get(pseudo)?.get(property).cloned()
}

/// Set or remove one property of a component's own rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCustomStyle {
    pub id: String,
    pub breakpoint: String,
    pub pseudo: String,
    pub change: Change<Entry<String>>,
}

impl SetCustomStyle {
    /// Build the change that sets `property` to `value` (or removes it)
    pub fn set(
        site: &Site,
        id: &str,
        breakpoint: &str,
        pseudo: &str,
        property: &str,
        value: Option<&str>,
    ) -> Option<Self> {
        let old = style_value(&site.component(id)?.style.custom, breakpoint, pseudo, property);
        Some(Self {
            id: id.to_string(),
            breakpoint: breakpoint.to_string(),
            pseudo: pseudo.to_string(),
            change: Change::keyed(property, old, value.map(str::to_string))?,
        })
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            apply_style_entry(
                &mut component.style.custom,
                &self.breakpoint,
                &self.pseudo,
                &self.change,
                direction,
            );
        }
    }
}

impl CommandOp for SetCustomStyle {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Set or remove one property of a child-selector override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOverrideStyle {
    pub id: String,
    pub selector: String,
    pub breakpoint: String,
    pub pseudo: String,
    pub change: Change<Entry<String>>,
}

impl SetOverrideStyle {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        let Some(component) = cx.site.context.component_mut(&self.id) else {
            return;
        };
        let overrides = &mut component.style.overrides;
        let styles = overrides.entry(self.selector.clone()).or_default();
        apply_style_entry(styles, &self.breakpoint, &self.pseudo, &self.change, direction);
        if styles.is_empty() {
            overrides.remove(&self.selector);
        }
    }
}

impl CommandOp for SetOverrideStyle {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Set or remove one property of a style mixin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMixinEntry {
    pub style_id: String,
    pub breakpoint: String,
    pub pseudo: String,
    pub change: Change<Entry<String>>,
}

impl SetMixinEntry {
    pub fn set(
        site: &Site,
        style_id: &str,
        breakpoint: &str,
        pseudo: &str,
        property: &str,
        value: Option<&str>,
    ) -> Option<Self> {
        let style = site.context.styles.get(style_id)?;
        let old = style_value(&style.breakpoints, breakpoint, pseudo, property);
        Some(Self {
            style_id: style_id.to_string(),
            breakpoint: breakpoint.to_string(),
            pseudo: pseudo.to_string(),
            change: Change::keyed(property, old, value.map(str::to_string))?,
        })
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(style) = cx.site.context.styles.get_mut(&self.style_id) {
            apply_style_entry(
                &mut style.breakpoints,
                &self.breakpoint,
                &self.pseudo,
                &self.change,
                direction,
            );
        }
    }
}

impl CommandOp for SetMixinEntry {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Attach a mixin to a component. Attaching one that is already present
/// does nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComponentMixin {
    pub id: String,
    pub mixin_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub added: bool,
}

impl AddComponentMixin {
    pub fn new(id: impl Into<String>, mixin_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mixin_id: mixin_id.into(),
            index: None,
            added: false,
        }
    }
}

impl CommandOp for AddComponentMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.added = false;
        let Some(component) = cx.site.context.component_mut(&self.id) else {
            return Ok(());
        };
        let mixins = &mut component.style.mixins;
        if mixins.contains(&self.mixin_id) {
            return Ok(());
        }
        let at = self.index.unwrap_or(mixins.len()).min(mixins.len());
        mixins.insert(at, self.mixin_id.clone());
        self.added = true;
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if !self.added {
            return Ok(());
        }
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            component.style.mixins.retain(|m| m != &self.mixin_id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveComponentMixin {
    pub id: String,
    pub mixin_id: String,
    /// Position the mixin was removed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl RemoveComponentMixin {
    pub fn new(id: impl Into<String>, mixin_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mixin_id: mixin_id.into(),
            index: None,
        }
    }
}

impl CommandOp for RemoveComponentMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.index = cx.site.context.component_mut(&self.id).and_then(|component| {
            let mixins = &mut component.style.mixins;
            let at = mixins.iter().position(|m| m == &self.mixin_id)?;
            mixins.remove(at);
            Some(at)
        });
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(index) = self.index else {
            return Ok(());
        };
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            let mixins = &mut component.style.mixins;
            mixins.insert(index.min(mixins.len()), self.mixin_id.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replaced {
    pub index: usize,
    /// The new mixin was already attached, so the old one was only removed
    pub merged: bool,
}

/// Swap one attached mixin for another in the same precedence slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceComponentMixin {
    pub id: String,
    pub old_mixin: String,
    pub new_mixin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced: Option<Replaced>,
}

impl ReplaceComponentMixin {
    pub fn new(id: impl Into<String>, old_mixin: impl Into<String>, new_mixin: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            old_mixin: old_mixin.into(),
            new_mixin: new_mixin.into(),
            replaced: None,
        }
    }
}

impl CommandOp for ReplaceComponentMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.replaced = cx.site.context.component_mut(&self.id).and_then(|component| {
            let mixins = &mut component.style.mixins;
            let index = mixins.iter().position(|m| m == &self.old_mixin)?;
            let merged = mixins
                .iter()
                .enumerate()
                .any(|(i, m)| i != index && m == &self.new_mixin);
            if merged {
                mixins.remove(index);
            } else {
                mixins[index] = self.new_mixin.clone();
            }
            Some(Replaced { index, merged })
        });
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(replaced) = self.replaced else {
            return Ok(());
        };
        let Some(component) = cx.site.context.component_mut(&self.id) else {
            return Ok(());
        };
        let mixins = &mut component.style.mixins;
        if replaced.merged {
            mixins.insert(replaced.index.min(mixins.len()), self.old_mixin.clone());
        } else if let Some(slot) = mixins.get_mut(replaced.index) {
            *slot = self.old_mixin.clone();
        }
        Ok(())
    }
}

/// Create a style mixin and give it a slot in the precedence order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStyleMixin {
    pub name: String,
    #[serde(default)]
    pub breakpoints: BreakpointStyles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl AddStyleMixin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            breakpoints: BreakpointStyles::new(),
            index: None,
            created: None,
        }
    }
}

impl CommandOp for AddStyleMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let ctx = &mut cx.site.context;
        let id = ctx.ids.new_id(IdKind::Style);
        ctx.styles.insert(
            id.clone(),
            Style {
                id: id.clone(),
                name: self.name.clone(),
                breakpoints: self.breakpoints.clone(),
            },
        );
        let order = &mut ctx.style_order;
        let at = self.index.unwrap_or(order.len()).min(order.len());
        order.insert(at, id.clone());
        self.created = Some(id);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(id) = self.created.take() else {
            return Ok(());
        };
        let ctx = &mut cx.site.context;
        ctx.styles.remove(&id);
        ctx.style_order.retain(|s| s != &id);
        ctx.ids.release(1);
        Ok(())
    }
}

/// A mixin attachment removed alongside its style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub component_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedStyle {
    pub style: Style,
    /// Position in the precedence order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Delete a mixin, detaching it from every component that uses it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveStyleMixin {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<RemovedStyle>,
}

impl RemoveStyleMixin {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            removed: None,
        }
    }
}

impl CommandOp for RemoveStyleMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let ctx = &mut cx.site.context;
        let Some(style) = ctx.styles.remove(&self.id) else {
            self.removed = None;
            return Ok(());
        };

        let index = ctx.style_order.iter().position(|s| s == &self.id);
        if let Some(at) = index {
            ctx.style_order.remove(at);
        }

        let mut attachments = Vec::new();
        for component in ctx.components.values_mut() {
            let mixins = &mut component.style.mixins;
            if let Some(at) = mixins.iter().position(|m| m == &self.id) {
                mixins.remove(at);
                attachments.push(Attachment {
                    component_id: component.id.clone(),
                    index: at,
                });
            }
        }
        debug!(style_id = %self.id, ?index, detached = attachments.len(), "Removed style mixin");

        self.removed = Some(RemovedStyle {
            style,
            index,
            attachments,
        });
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(removed) = &self.removed else {
            return Ok(());
        };
        let ctx = &mut cx.site.context;
        ctx.styles.insert(self.id.clone(), removed.style.clone());
        if let Some(index) = removed.index {
            let at = index.min(ctx.style_order.len());
            ctx.style_order.insert(at, self.id.clone());
        }
        for attachment in &removed.attachments {
            if let Some(component) = ctx.components.get_mut(&attachment.component_id) {
                let mixins = &mut component.style.mixins;
                mixins.insert(attachment.index.min(mixins.len()), self.id.clone());
            }
        }
        Ok(())
    }
}

/// Replace the whole precedence order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMixinOrder {
    pub old: Vec<String>,
    pub new: Vec<String>,
}

impl UpdateMixinOrder {
    pub fn to(site: &Site, new: Vec<String>) -> Self {
        Self {
            old: site.context.style_order.clone(),
            new,
        }
    }
}

impl CommandOp for UpdateMixinOrder {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        cx.site.context.style_order = self.new.clone();
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        cx.site.context.style_order = self.old.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameStyleMixin {
    pub id: String,
    pub old: String,
    pub new: String,
}

impl RenameStyleMixin {
    fn set(cx: &mut CommandContext<'_>, id: &str, name: &str) {
        if let Some(style) = cx.site.context.styles.get_mut(id) {
            style.name = name.to_string();
        }
    }
}

impl CommandOp for RenameStyleMixin {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.new);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.old);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBreakpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl AddBreakpoint {
    pub fn new(name: impl Into<String>, min_width: Option<u32>, max_width: Option<u32>) -> Self {
        Self {
            name: name.into(),
            min_width,
            max_width,
            created: None,
        }
    }
}

impl CommandOp for AddBreakpoint {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let ctx = &mut cx.site.context;
        let id = ctx.ids.new_id(IdKind::Breakpoint);
        ctx.breakpoints.insert(
            id.clone(),
            Breakpoint {
                id: id.clone(),
                name: self.name.clone(),
                min_width: self.min_width,
                max_width: self.max_width,
            },
        );
        self.created = Some(id);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if let Some(id) = self.created.take() {
            let ctx = &mut cx.site.context;
            ctx.breakpoints.remove(&id);
            ctx.ids.release(1);
        }
        Ok(())
    }
}

/// Remove a breakpoint definition. Rules keyed by it are left in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveBreakpoint {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<Breakpoint>,
}

impl RemoveBreakpoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            removed: None,
        }
    }
}

impl CommandOp for RemoveBreakpoint {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.removed = cx.site.context.breakpoints.remove(&self.id);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if let Some(breakpoint) = &self.removed {
            cx.site
                .context
                .breakpoints
                .insert(self.id.clone(), breakpoint.clone());
        }
        Ok(())
    }
}

/// Rename or resize a breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBreakpoint {
    pub id: String,
    pub old: Breakpoint,
    pub new: Breakpoint,
}

impl UpdateBreakpoint {
    pub fn capture(
        site: &Site,
        id: &str,
        name: impl Into<String>,
        min_width: Option<u32>,
        max_width: Option<u32>,
    ) -> Option<Self> {
        let old = site.context.breakpoints.get(id)?.clone();
        let new = Breakpoint {
            id: id.to_string(),
            name: name.into(),
            min_width,
            max_width,
        };
        Some(Self {
            id: id.to_string(),
            old,
            new,
        })
    }

    fn set(cx: &mut CommandContext<'_>, id: &str, value: &Breakpoint) {
        if let Some(slot) = cx.site.context.breakpoints.get_mut(id) {
            *slot = value.clone();
        }
    }
}

impl CommandOp for UpdateBreakpoint {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.new);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.old);
        Ok(())
    }
}

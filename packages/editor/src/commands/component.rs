//! Structural and per-component commands
//!
//! ## Add
//! - Allocates ids in pre-order (root first), splices the new root into the
//!   parent at `index` or appends it
//! - Copies from a source are deep and get fresh ids
//! - Undo removes the subtree and hands back every consumed id
//!
//! ## Remove
//! - Captures the literal subtree, its position and editor bookkeeping
//! - Undo reinserts the captured nodes; no ids are minted
//!
//! ## Move
//! - Never mints or frees ids; moving into the component's own subtree is
//!   ignored

use crate::change::{apply_entry, Change, Direction, Entry};
use crate::command_trait::CommandOp;
use crate::dispatch::CommandContext;
use crate::editor_state::Bookkeeping;
use crate::errors::EditorResult;
use crate::hooks::{self, LifecycleEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitecraft_document::{
    BehaviorRef, Component, ComponentStyle, Context, IdAllocator, IdKind, Site,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Description of a component (and its children) to create
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub tag: String,
    /// Ignored when `children` is non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "ComponentStyle::is_empty")]
    pub style: ComponentStyle,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, Vec<BehaviorRef>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub editor_events: BTreeMap<String, Vec<BehaviorRef>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentSpec>,
}

impl ComponentSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: ComponentSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_event(mut self, event: impl Into<String>, behaviors: Vec<BehaviorRef>) -> Self {
        self.events.insert(event.into(), behaviors);
        self
    }

    pub fn with_editor_event(mut self, event: impl Into<String>, behaviors: Vec<BehaviorRef>) -> Self {
        self.editor_events.insert(event.into(), behaviors);
        self
    }

    /// Number of components this spec creates
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ComponentSpec::node_count).sum::<usize>()
    }
}

/// What an [`AddComponent`] creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum ComponentTemplate {
    /// Build fresh components from a spec
    Spec(ComponentSpec),
    /// Deep-copy an existing subtree
    Duplicate { source: String },
    /// Deep-copy a reusable template, recording provenance on every copy
    CustomInstance { source: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComponent {
    pub parent_id: String,
    /// Insert position among the parent's children; appends when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub template: ComponentTemplate,
    /// Root id minted by the last apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Ids consumed by the last apply
    #[serde(default)]
    pub allocated: u64,
}

impl AddComponent {
    pub fn new(parent_id: impl Into<String>, spec: ComponentSpec) -> Self {
        Self::from_template(parent_id, ComponentTemplate::Spec(spec))
    }

    pub fn duplicate(parent_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::from_template(
            parent_id,
            ComponentTemplate::Duplicate {
                source: source.into(),
            },
        )
    }

    pub fn custom_instance(parent_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::from_template(
            parent_id,
            ComponentTemplate::CustomInstance {
                source: source.into(),
            },
        )
    }

    fn from_template(parent_id: impl Into<String>, template: ComponentTemplate) -> Self {
        Self {
            parent_id: parent_id.into(),
            index: None,
            template,
            created: None,
            allocated: 0,
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl CommandOp for AddComponent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.created = None;
        self.allocated = 0;

        let ctx = &mut cx.site.context;
        match ctx.components.get(&self.parent_id) {
            None => {
                debug!(parent_id = %self.parent_id, "AddComponent: parent not found");
                return Ok(());
            }
            Some(parent) if parent.is_leaf() => {
                debug!(parent_id = %self.parent_id, "AddComponent: parent holds content");
                return Ok(());
            }
            Some(_) => {}
        }

        let start = ctx.ids.next_id();
        let copies = match &self.template {
            ComponentTemplate::Spec(spec) => {
                let mut nodes = Vec::with_capacity(spec.node_count());
                build_from_spec(&mut ctx.ids, spec, None, &mut nodes);
                nodes.into_iter().map(|node| (None, node)).collect()
            }
            ComponentTemplate::Duplicate { source } => copy_subtree(ctx, source, false),
            ComponentTemplate::CustomInstance { source } => copy_subtree(ctx, source, true),
        };
        let Some(root_id) = copies.first().map(|(_, node)| node.id.clone()) else {
            debug!("AddComponent: source not found");
            return Ok(());
        };

        let instance_of = match &self.template {
            ComponentTemplate::CustomInstance { source } => Some(source.as_str()),
            _ => None,
        };
        let mut created_ids = Vec::with_capacity(copies.len());
        for (original, node) in copies {
            let marks_child = match (original.as_deref(), instance_of) {
                (Some(original), Some(source)) => original != source,
                (Some(original), None) => ctx.custom_child_ids.contains(original),
                (None, _) => false,
            };
            if marks_child {
                ctx.custom_child_ids.insert(node.id.clone());
            }
            created_ids.push(node.id.clone());
            ctx.components.insert(node.id.clone(), node);
        }
        ctx.attach(&root_id, &self.parent_id, self.index);

        self.allocated = ctx.ids.next_id() - start;
        self.created = Some(root_id);

        if let Some(state) = cx.state.as_deref_mut() {
            for id in &created_ids {
                if let Some(component) = cx.site.context.components.get(id) {
                    state.register_component(component);
                }
            }
        }

        if !cx.replay {
            hooks::notify(cx, LifecycleEvent::SelfAdded, &created_ids);
        }
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let Some(root) = self.created.as_deref() else {
            return Ok(());
        };
        if remove_subtree(cx, root).is_some() {
            cx.site.context.ids.release(self.allocated);
        }
        Ok(())
    }
}

/// Mint ids in pre-order and push the built nodes onto `out`
fn build_from_spec(
    ids: &mut IdAllocator,
    spec: &ComponentSpec,
    parent: Option<&str>,
    out: &mut Vec<Component>,
) -> String {
    let id = ids.new_id(IdKind::Component);
    let slot = out.len();
    out.push(Component {
        id: id.clone(),
        parent: parent.map(str::to_string),
        children: Vec::new(),
        content: if spec.children.is_empty() {
            spec.content.clone()
        } else {
            None
        },
        tag: spec.tag.clone(),
        style: spec.style.clone(),
        inputs: spec.inputs.clone(),
        events: spec.events.clone(),
        editor_events: spec.editor_events.clone(),
        state: spec.state.clone(),
        custom_source_id: None,
        reusable_source_id: None,
    });

    let children = spec
        .children
        .iter()
        .map(|child| build_from_spec(ids, child, Some(&id), out))
        .collect();
    out[slot].children = children;
    id
}

/// Deep-copy the subtree at `source` with fresh ids, paired with the id each
/// copy was made from. Empty when `source` does not exist.
fn copy_subtree(ctx: &mut Context, source: &str, instance: bool) -> Vec<(Option<String>, Component)> {
    let originals = ctx.descendants(source);
    let mapping: BTreeMap<String, String> = originals
        .iter()
        .map(|original| (original.clone(), ctx.ids.new_id(IdKind::Component)))
        .collect();

    let mut copies = Vec::with_capacity(originals.len());
    for original in &originals {
        let Some(node) = ctx.components.get(original) else {
            continue;
        };
        let mut copy = node.clone();
        copy.id = mapping[original].clone();
        copy.parent = if original == source {
            None
        } else {
            node.parent.as_ref().and_then(|p| mapping.get(p)).cloned()
        };
        copy.children = node
            .children
            .iter()
            .filter_map(|child| mapping.get(child).cloned())
            .collect();
        if instance {
            copy.reusable_source_id = Some(original.clone());
            if original == source {
                copy.custom_source_id = Some(source.to_string());
            }
        }
        copies.push((Some(original.clone()), copy));
    }
    copies
}

/// Components detached from the arena, exactly as they were stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedNodes {
    /// Pre-order
    pub nodes: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_child_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookkeeping: Option<Bookkeeping>,
}

/// Remove `root` and its descendants (children first) from the arena
pub(crate) fn take_nodes(cx: &mut CommandContext<'_>, root: &str) -> DetachedNodes {
    let ctx = &mut cx.site.context;
    let ids = ctx.descendants(root);

    let mut nodes: Vec<Component> = ids
        .iter()
        .rev()
        .filter_map(|id| ctx.components.remove(id))
        .collect();
    nodes.reverse();

    let mut custom_ids = Vec::new();
    let mut custom_child_ids = Vec::new();
    for id in &ids {
        if ctx.custom_component_ids.remove(id) {
            custom_ids.push(id.clone());
        }
        if ctx.custom_child_ids.remove(id) {
            custom_child_ids.push(id.clone());
        }
    }

    let bookkeeping = cx.state.as_deref_mut().map(|state| state.purge(&ids));

    DetachedNodes {
        nodes,
        custom_ids,
        custom_child_ids,
        bookkeeping,
    }
}

/// Put previously detached nodes back into the arena
pub(crate) fn restore_nodes(cx: &mut CommandContext<'_>, detached: &DetachedNodes) {
    let ctx = &mut cx.site.context;
    for node in &detached.nodes {
        ctx.components.insert(node.id.clone(), node.clone());
    }
    ctx.custom_component_ids
        .extend(detached.custom_ids.iter().cloned());
    ctx.custom_child_ids
        .extend(detached.custom_child_ids.iter().cloned());

    if let (Some(state), Some(bookkeeping)) = (cx.state.as_deref_mut(), &detached.bookkeeping) {
        state.restore(bookkeeping);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedSubtree {
    pub parent_id: String,
    pub index: usize,
    #[serde(flatten)]
    pub detached: DetachedNodes,
}

/// Unsplice `id` from its parent and free its subtree. Page roots have no
/// parent and are left alone.
pub(crate) fn remove_subtree(cx: &mut CommandContext<'_>, id: &str) -> Option<RemovedSubtree> {
    let (parent_id, index) = cx.site.context.position_of(id)?;
    let detached = take_nodes(cx, id);
    if let Some(parent) = cx.site.context.components.get_mut(&parent_id) {
        parent.children.remove(index);
    }
    Some(RemovedSubtree {
        parent_id,
        index,
        detached,
    })
}

fn restore_subtree(cx: &mut CommandContext<'_>, removed: &RemovedSubtree) {
    let Some(root) = removed.detached.nodes.first().map(|n| n.id.clone()) else {
        return;
    };
    if !cx.site.context.components.contains_key(&removed.parent_id) {
        return;
    }
    restore_nodes(cx, &removed.detached);
    if let Some(parent) = cx.site.context.components.get_mut(&removed.parent_id) {
        let at = removed.index.min(parent.children.len());
        parent.children.insert(at, root);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveComponent {
    pub id: String,
    /// Captured by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<RemovedSubtree>,
}

impl RemoveComponent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            removed: None,
        }
    }
}

impl CommandOp for RemoveComponent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.removed = remove_subtree(cx, &self.id);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if let Some(removed) = &self.removed {
            restore_subtree(cx, removed);
        }
        Ok(())
    }
}

/// A slot among a parent's children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub parent_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveComponent {
    pub id: String,
    pub from: Position,
    pub to: Position,
}

impl MoveComponent {
    /// Move `id` from wherever it currently sits
    pub fn capture(site: &Site, id: &str, parent_id: impl Into<String>, index: usize) -> Option<Self> {
        let (from_parent, from_index) = site.context.position_of(id)?;
        Some(Self {
            id: id.to_string(),
            from: Position {
                parent_id: from_parent,
                index: from_index,
            },
            to: Position {
                parent_id: parent_id.into(),
                index,
            },
        })
    }

    fn relocate(cx: &mut CommandContext<'_>, id: &str, to: &Position) {
        let ctx = &mut cx.site.context;
        match ctx.components.get(&to.parent_id) {
            Some(target) if !target.is_leaf() => {}
            _ => return,
        }
        if ctx.is_ancestor(id, &to.parent_id) {
            debug!(id, parent_id = %to.parent_id, "MoveComponent: would create cycle");
            return;
        }
        if ctx.detach(id).is_some() {
            ctx.attach(id, &to.parent_id, Some(to.index));
        }
    }
}

impl CommandOp for MoveComponent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::relocate(cx, &self.id, &self.to);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::relocate(cx, &self.id, &self.from);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentTag {
    pub id: String,
    pub old: String,
    pub new: String,
}

impl SetComponentTag {
    fn set(cx: &mut CommandContext<'_>, id: &str, tag: &str) {
        if let Some(component) = cx.site.context.component_mut(id) {
            component.tag = tag.to_string();
        }
    }
}

impl CommandOp for SetComponentTag {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.new);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        Self::set(cx, &self.id, &self.old);
        Ok(())
    }
}

/// Replace a leaf's text. Components with children are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentContent {
    pub id: String,
    pub change: Change<String>,
}

impl SetComponentContent {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        let Some(component) = cx.site.context.component_mut(&self.id) else {
            return;
        };
        if !component.children.is_empty() {
            debug!(id = %self.id, "SetComponentContent: component has children");
            return;
        }
        let (_, inserted) = self.change.sides(direction);
        component.content = inserted.cloned();
    }
}

impl CommandOp for SetComponentContent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentInput {
    pub id: String,
    pub change: Change<Entry<Value>>,
}

impl SetComponentInput {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            apply_entry(&mut component.inputs, &self.change, direction);
        }
    }
}

impl CommandOp for SetComponentInput {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Set, remove or rename a state key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentState {
    pub id: String,
    pub change: Change<Entry<Value>>,
}

impl SetComponentState {
    pub fn capture(site: &Site, id: &str, key: &str, value: Option<Value>) -> Option<Self> {
        let old = site.component(id)?.state.get(key).cloned();
        Some(Self {
            id: id.to_string(),
            change: Change::keyed(key, old, value)?,
        })
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            apply_entry(&mut component.state, &self.change, direction);
        }
    }
}

impl CommandOp for SetComponentState {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentEvent {
    pub id: String,
    pub change: Change<Entry<Vec<BehaviorRef>>>,
}

impl SetComponentEvent {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(component) = cx.site.context.component_mut(&self.id) {
            apply_entry(&mut component.events, &self.change, direction);
        }
    }
}

impl CommandOp for SetComponentEvent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Editor (lifecycle) event slot; keeps the lifecycle registry in step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComponentEditorEvent {
    pub id: String,
    pub change: Change<Entry<Vec<BehaviorRef>>>,
}

impl SetComponentEditorEvent {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        let Some(component) = cx.site.context.component_mut(&self.id) else {
            return;
        };
        apply_entry(&mut component.editor_events, &self.change, direction);

        if let Some(state) = cx.state.as_deref_mut() {
            let (removed, inserted) = self.change.sides(direction);
            if let Some(old) = removed {
                state.unregister(&old.key, &self.id);
            }
            if let Some(new) = inserted.filter(|new| !new.value.is_empty()) {
                state.register(&new.key, &self.id);
            }
        }
    }
}

impl CommandOp for SetComponentEditorEvent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// Mark or unmark a component as a reusable template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkCustomComponent {
    pub id: String,
    pub mark: bool,
    /// Whether the last apply changed membership
    #[serde(default)]
    pub changed: bool,
}

impl MarkCustomComponent {
    pub fn new(id: impl Into<String>, mark: bool) -> Self {
        Self {
            id: id.into(),
            mark,
            changed: false,
        }
    }

    fn set(cx: &mut CommandContext<'_>, id: &str, mark: bool) -> bool {
        let ctx = &mut cx.site.context;
        if !ctx.components.contains_key(id) {
            return false;
        }
        if mark {
            ctx.custom_component_ids.insert(id.to_string())
        } else {
            ctx.custom_component_ids.remove(id)
        }
    }
}

impl CommandOp for MarkCustomComponent {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.changed = Self::set(cx, &self.id, self.mark);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if self.changed {
            Self::set(cx, &self.id, !self.mark);
        }
        Ok(())
    }
}

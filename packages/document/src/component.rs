use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// property → value
pub type PropertyMap = BTreeMap<String, String>;

/// pseudo-class → property → value
pub type PseudoStyles = BTreeMap<String, PropertyMap>;

/// breakpoint id → pseudo-class → property → value
pub type BreakpointStyles = BTreeMap<String, PseudoStyles>;

/// Reference from an event slot to a behavior in the site (or built-in) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorRef {
    pub behavior_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
}

impl BehaviorRef {
    pub fn new(behavior_id: impl Into<String>) -> Self {
        Self {
            behavior_id: behavior_id.into(),
            args: BTreeMap::new(),
        }
    }
}

/// Styling attached to a single component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStyle {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BreakpointStyles,

    /// Style ids in precedence order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,

    /// child selector → breakpoint → pseudo-class → property → value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, BreakpointStyles>,
}

impl ComponentStyle {
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.mixins.is_empty() && self.overrides.is_empty()
    }
}

/// A node in the component arena.
///
/// `parent` and `children` are ids resolved through
/// [`Context::components`](crate::Context); the parent owns its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,

    /// Absent only for a page root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,

    /// Leaf text/markup; never populated alongside `children`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub tag: String,

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

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reusable_source_id: Option<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.content.is_some()
    }

    /// Every behavior id referenced by `events` and `editor_events`
    pub fn behavior_ids(&self) -> impl Iterator<Item = &str> {
        self.events
            .values()
            .chain(self.editor_events.values())
            .flatten()
            .map(|r| r.behavior_id.as_str())
    }
}

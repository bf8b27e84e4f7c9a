//! # Commands
//!
//! Every document mutation is a [`Command`]: a tagged payload that carries
//! its forward effect plus whatever it needs to invert itself exactly.
//! Payload structs live in the family modules; each implements
//! [`CommandOp`](crate::command_trait::CommandOp) and records the state
//! it displaces during `apply`.
//!
//! Commands serialize as `{ "kind": "...", "data": { ... } }`.

pub mod component;
pub mod page;
pub mod site;
pub mod style;

pub use component::{
    AddComponent, ComponentSpec, ComponentTemplate, DetachedNodes, MarkCustomComponent,
    MoveComponent, Position, RemoveComponent, RemovedSubtree, SetComponentContent,
    SetComponentEditorEvent, SetComponentEvent, SetComponentInput, SetComponentState,
    SetComponentTag,
};
pub use page::{AddPage, EditPage, PageMeta, RemovePage, RemovedPage, SetHomePage};
pub use site::{
    AddBehavior, SetBehavior, SetBehaviorArg, SetDefaultsHead, SetGlobalStyle, SetPageHead,
    SetSiteVersion, SetThemeFont, SetThemeVariable, SetTranslation,
};
pub use style::{
    AddBreakpoint, AddComponentMixin, AddStyleMixin, Attachment, RemoveBreakpoint,
    RemoveComponentMixin, RemoveStyleMixin, RemovedStyle, RenameStyleMixin, ReplaceComponentMixin,
    Replaced, SetCustomStyle, SetMixinEntry, SetOverrideStyle, UpdateBreakpoint, UpdateMixinOrder,
};

use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};

/// Ordered composite. Applies front to back and undoes back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Group {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            description: None,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

macro_rules! commands {
    ($($kind:ident),+ $(,)?) => {
        /// Every reversible document mutation
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind", content = "data")]
        pub enum Command {
            $($kind($kind),)+
        }

        impl Command {
            /// Wire tags of every known kind
            pub const KINDS: &'static [&'static str] = &[$(stringify!($kind)),+];

            pub fn kind(&self) -> &'static str {
                match self {
                    $(Command::$kind(_) => stringify!($kind),)+
                }
            }
        }

        $(
            impl From<$kind> for Command {
                fn from(command: $kind) -> Self {
                    Command::$kind(command)
                }
            }
        )+
    };
}

commands! {
    AddComponent,
    RemoveComponent,
    MoveComponent,
    SetComponentTag,
    SetComponentContent,
    SetComponentInput,
    SetComponentState,
    SetComponentEvent,
    SetComponentEditorEvent,
    MarkCustomComponent,
    SetCustomStyle,
    SetOverrideStyle,
    SetMixinEntry,
    AddComponentMixin,
    RemoveComponentMixin,
    ReplaceComponentMixin,
    AddStyleMixin,
    RemoveStyleMixin,
    UpdateMixinOrder,
    RenameStyleMixin,
    AddBreakpoint,
    RemoveBreakpoint,
    UpdateBreakpoint,
    AddBehavior,
    SetBehavior,
    SetBehaviorArg,
    SetThemeVariable,
    SetThemeFont,
    SetGlobalStyle,
    SetTranslation,
    SetPageHead,
    SetDefaultsHead,
    SetSiteVersion,
    AddPage,
    EditPage,
    RemovePage,
    SetHomePage,
    Group,
}

impl Command {
    /// Human-readable label for history UIs
    pub fn description(&self) -> String {
        match self {
            Command::Group(Group {
                description: Some(description),
                ..
            }) => description.clone(),
            other => other.kind().to_string(),
        }
    }

    /// Decode a serialized command. Unknown kinds are rejected before the
    /// payload is looked at.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if !Self::KINDS.contains(&kind) {
            return Err(EditorError::UnknownCommand(kind.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

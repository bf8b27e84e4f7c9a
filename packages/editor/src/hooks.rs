//! # Editor hooks
//!
//! Outward calls made by the engine: persistence after each top-level
//! history operation and behavior execution on lifecycle events. Both are
//! fire-and-forget; the engine never inspects a result.

use crate::dispatch::CommandContext;
use sitecraft_document::{BehaviorRef, Site};
use std::fmt;
use tracing::debug;

/// Lifecycle events that trigger editor behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A component was created (first apply only, never on redo)
    SelfAdded,
    PageAdded,
    PageRemoved,
    PageChanged,
}

impl LifecycleEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::SelfAdded => "self-added",
            LifecycleEvent::PageAdded => "page-added",
            LifecycleEvent::PageRemoved => "page-removed",
            LifecycleEvent::PageChanged => "page-changed",
        }
    }
}

/// Collaborators invoked by the engine
pub trait EditorHooks: fmt::Debug {
    /// Called after each top-level push, undo and redo
    fn persist(&mut self, _site: &Site) {}

    /// Run `behaviors` for `component_id` in response to `event`
    fn run_behaviors(
        &mut self,
        _site: &Site,
        _component_id: &str,
        _event: LifecycleEvent,
        _behaviors: &[BehaviorRef],
    ) {
    }
}

#[derive(Debug, Default)]
pub struct NoopHooks;

impl EditorHooks for NoopHooks {}

/// A single observed hook invocation
#[derive(Debug, Clone, PartialEq)]
pub enum HookCall {
    Persist,
    Behaviors {
        component_id: String,
        event: LifecycleEvent,
        behavior_ids: Vec<String>,
    },
}

/// Hooks that remember every call, for tests and tooling
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub calls: Vec<HookCall>,
}

impl RecordingHooks {
    pub fn persist_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HookCall::Persist))
            .count()
    }

    /// Component ids that ran behaviors for `event`, in call order
    pub fn triggered(&self, event: LifecycleEvent) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HookCall::Behaviors {
                    component_id,
                    event: e,
                    ..
                } if *e == event => Some(component_id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EditorHooks for RecordingHooks {
    fn persist(&mut self, _site: &Site) {
        self.calls.push(HookCall::Persist);
    }

    fn run_behaviors(
        &mut self,
        _site: &Site,
        component_id: &str,
        event: LifecycleEvent,
        behaviors: &[BehaviorRef],
    ) {
        self.calls.push(HookCall::Behaviors {
            component_id: component_id.to_string(),
            event,
            behavior_ids: behaviors.iter().map(|b| b.behavior_id.clone()).collect(),
        });
    }
}

/// Notify every component listening for a site-wide lifecycle event
pub(crate) fn fire_lifecycle(cx: &mut CommandContext<'_>, event: LifecycleEvent) {
    let listeners = match cx.state.as_deref() {
        Some(state) => state.listeners(event.as_str()),
        None => cx
            .site
            .context
            .components
            .values()
            .filter(|c| {
                c.editor_events
                    .get(event.as_str())
                    .is_some_and(|behaviors| !behaviors.is_empty())
            })
            .map(|c| c.id.clone())
            .collect(),
    };
    notify(cx, event, &listeners);
}

/// Run the behaviors each of `ids` binds to `event`
pub(crate) fn notify(cx: &mut CommandContext<'_>, event: LifecycleEvent, ids: &[String]) {
    let site = &*cx.site;
    for id in ids {
        let Some(behaviors) = site
            .context
            .components
            .get(id)
            .and_then(|c| c.editor_events.get(event.as_str()))
        else {
            continue;
        };
        if behaviors.is_empty() {
            continue;
        }
        debug!(component_id = %id, event = event.as_str(), count = behaviors.len(), "Running lifecycle behaviors");
        cx.hooks.run_behaviors(site, id, event, behaviors);
    }
}

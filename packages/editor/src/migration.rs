//! # Schema migration
//!
//! Versions form a fixed chain (`"1" → "2" → "3"`). Every step is pushed
//! through the editor's history as an ordinary group, so a migration can be
//! undone and redone like any other edit.
//!
//! - `1 → 2`: built-in behaviors referenced by component events are copied
//!   into the site's behavior table, making the document self-contained
//! - `2 → 3`: tag rewrite only
//!
//! A missing step is logged and stops the walk at the last version reached.

use crate::change::Change;
use crate::commands::{Command, Group, SetBehavior, SetSiteVersion};
use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::hooks::EditorHooks;
use sitecraft_document::{Behavior, Site};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Id prefix shared by every behavior in [`BUILTIN_BEHAVIORS`]
pub const BUILTIN_PREFIX: &str = "builtin:";

/// A behavior shipped with the editor rather than stored in the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinBehavior {
    pub id: &'static str,
    pub name: &'static str,
    pub code: &'static str,
}

impl BuiltinBehavior {
    pub fn to_behavior(&self) -> Behavior {
        Behavior {
            id: self.id.to_string(),
            name: self.name.to_string(),
            code: self.code.to_string(),
            args: BTreeMap::new(),
        }
    }
}

pub static BUILTIN_BEHAVIORS: &[BuiltinBehavior] = &[
    BuiltinBehavior {
        id: "builtin:toggle-class",
        name: "Toggle class",
        code: "element.classList.toggle(args.className);",
    },
    BuiltinBehavior {
        id: "builtin:show",
        name: "Show",
        code: "target.hidden = false;",
    },
    BuiltinBehavior {
        id: "builtin:hide",
        name: "Hide",
        code: "target.hidden = true;",
    },
    BuiltinBehavior {
        id: "builtin:scroll-to",
        name: "Scroll to",
        code: "target.scrollIntoView({ behavior: args.smooth ? 'smooth' : 'auto' });",
    },
    BuiltinBehavior {
        id: "builtin:open-link",
        name: "Open link",
        code: "window.open(args.href, args.newTab ? '_blank' : '_self');",
    },
    BuiltinBehavior {
        id: "builtin:submit-form",
        name: "Submit form",
        code: "element.closest('form')?.requestSubmit();",
    },
];

pub fn builtin_behavior(id: &str) -> Option<&'static BuiltinBehavior> {
    BUILTIN_BEHAVIORS.iter().find(|b| b.id == id)
}

struct MigrationStep {
    from: &'static str,
    to: &'static str,
    /// Body of the forward group, computed from the site before the step
    forward: fn(&Site) -> Vec<Command>,
    /// Body of the rollback group, computed from the site at `to`
    backward: fn(&Site) -> Vec<Command>,
}

static STEPS: &[MigrationStep] = &[
    MigrationStep {
        from: "1",
        to: "2",
        forward: inline_builtin_behaviors,
        backward: drop_builtin_behaviors,
    },
    MigrationStep {
        from: "2",
        to: "3",
        forward: tag_only,
        backward: tag_only,
    },
];

fn tag_only(_site: &Site) -> Vec<Command> {
    Vec::new()
}

/// Built-in behavior ids referenced anywhere in the component arena
pub fn referenced_builtins(site: &Site) -> BTreeSet<&'static str> {
    site.context
        .components
        .values()
        .flat_map(|component| component.behavior_ids())
        .filter_map(builtin_behavior)
        .map(|builtin| builtin.id)
        .collect()
}

fn inline_builtin_behaviors(site: &Site) -> Vec<Command> {
    referenced_builtins(site)
        .into_iter()
        .filter(|id| !site.context.behaviors.contains_key(*id))
        .filter_map(builtin_behavior)
        .map(|builtin| {
            Command::from(SetBehavior {
                change: Change::Insert {
                    new: builtin.to_behavior(),
                },
            })
        })
        .collect()
}

/// Only untouched inlined copies go; a site's own `builtin:` entries stay
fn drop_builtin_behaviors(site: &Site) -> Vec<Command> {
    site.context
        .behaviors
        .values()
        .filter(|behavior| {
            builtin_behavior(&behavior.id).is_some_and(|builtin| **behavior == builtin.to_behavior())
        })
        .map(|behavior| {
            Command::from(SetBehavior {
                change: Change::Remove {
                    old: behavior.clone(),
                },
            })
        })
        .collect()
}

fn step_group(mut body: Vec<Command>, from: &str, to: &str) -> Command {
    body.push(SetSiteVersion::new(from, to).into());
    Command::Group(Group::new(body).described(format!("Migrate site from v{from} to v{to}")))
}

/// Walk the forward chain until `target` is reached or a step is missing.
/// Returns the version the site ends up at.
pub fn apply_migrate_site<H: EditorHooks>(editor: &mut Editor<H>, target: &str) -> EditorResult<String> {
    loop {
        let current = editor.site().version.clone();
        if current == target {
            return Ok(current);
        }
        let Some(step) = STEPS.iter().find(|step| step.from == current) else {
            warn!(from = %current, target, "No migration step; stopping");
            return Ok(current);
        };

        let body = (step.forward)(editor.site());
        let copied = body.len();
        editor.push(step_group(body, step.from, step.to))?;
        info!(from = step.from, to = step.to, copied, "Migrated site");
    }
}

/// Walk the chain backwards until `target` is reached or a step is missing
pub fn rollback_site<H: EditorHooks>(editor: &mut Editor<H>, target: &str) -> EditorResult<String> {
    loop {
        let current = editor.site().version.clone();
        if current == target {
            return Ok(current);
        }
        let Some(step) = STEPS.iter().find(|step| step.to == current) else {
            warn!(from = %current, target, "No rollback step; stopping");
            return Ok(current);
        };

        let body = (step.backward)(editor.site());
        editor.push(step_group(body, step.to, step.from))?;
        info!(from = step.to, to = step.from, "Rolled back site");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_share_prefix() {
        assert!(BUILTIN_BEHAVIORS.iter().all(|b| b.id.starts_with(BUILTIN_PREFIX)));
        assert_eq!(builtin_behavior("builtin:show").unwrap().name, "Show");
        assert!(builtin_behavior("b-site-4").is_none());
    }

    #[test]
    fn test_steps_form_a_chain() {
        for pair in STEPS.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        assert_eq!(STEPS.last().map(|s| s.to), Some(sitecraft_document::SCHEMA_VERSION));
    }
}

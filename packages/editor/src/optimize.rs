//! # Command optimization and coalescing
//!
//! - [`optimize_command_group`] flattens degenerate groups
//! - [`fold`] replaces two consecutive edits of the same target with one that
//!   keeps the earliest "before" and the latest "after"
//! - [`merge`] appends a command to the previous one as a group
//!
//! A fold may cancel out entirely (e.g. a value edited and then edited back).

use crate::change::{Change, Entry};
use crate::commands::{
    Command, Group, MoveComponent, RenameStyleMixin, SetBehavior, SetBehaviorArg,
    SetComponentContent, SetComponentEditorEvent, SetComponentEvent, SetComponentInput,
    SetComponentState, SetComponentTag, SetCustomStyle, SetDefaultsHead, SetGlobalStyle,
    SetHomePage, SetMixinEntry, SetOverrideStyle, SetPageHead, SetSiteVersion, SetThemeFont,
    SetThemeVariable, SetTranslation, UpdateBreakpoint, UpdateMixinOrder,
};
use sitecraft_document::Behavior;

/// Drop empty groups and unwrap single-command groups, recursively
pub fn optimize_command_group(command: Command) -> Option<Command> {
    let Command::Group(group) = command else {
        return Some(command);
    };
    let Group {
        commands,
        description,
    } = group;

    let mut commands: Vec<Command> = commands
        .into_iter()
        .filter_map(optimize_command_group)
        .collect();

    match commands.len() {
        0 => None,
        1 => commands.pop(),
        _ => Some(Command::Group(Group {
            commands,
            description,
        })),
    }
}

/// Outcome of folding one command into another
#[derive(Debug, Clone, PartialEq)]
pub enum Fold {
    /// A single command with the combined effect
    Into(Command),
    /// The pair has no net effect
    Cancelled,
    /// Different kinds or targets; keep both
    Incompatible,
}

fn fold_keyed<V, F>(prev: &Change<Entry<V>>, next: &Change<Entry<V>>, rebuild: F) -> Fold
where
    V: Clone + PartialEq,
    F: FnOnce(Change<Entry<V>>) -> Command,
{
    if !prev.lines_up_with(next) {
        return Fold::Incompatible;
    }
    match prev.clone().followed_by(next.clone()) {
        Some(change) => Fold::Into(rebuild(change)),
        None => Fold::Cancelled,
    }
}

fn fold_values<T, F>(old: &T, new: &T, rebuild: F) -> Fold
where
    T: Clone + PartialEq,
    F: FnOnce(T, T) -> Command,
{
    if old == new {
        Fold::Cancelled
    } else {
        Fold::Into(rebuild(old.clone(), new.clone()))
    }
}

fn behavior_id(change: &Change<Behavior>, after: bool) -> Option<&str> {
    let side = if after { change.after() } else { change.before() };
    side.or_else(|| change.before()).map(|b| b.id.as_str())
}

/// Fold `next` into `prev`, where `next` ran immediately after `prev`
pub fn fold(prev: &Command, next: &Command) -> Fold {
    use Command as C;

    match (prev, next) {
        (C::SetComponentTag(a), C::SetComponentTag(b)) if a.id == b.id => {
            fold_values(&a.old, &b.new, |old, new| {
                SetComponentTag {
                    id: a.id.clone(),
                    old,
                    new,
                }
                .into()
            })
        }
        (C::SetComponentContent(a), C::SetComponentContent(b)) if a.id == b.id => {
            match a.change.clone().followed_by(b.change.clone()) {
                Some(change) => Fold::Into(
                    SetComponentContent {
                        id: a.id.clone(),
                        change,
                    }
                    .into(),
                ),
                None => Fold::Cancelled,
            }
        }
        (C::SetComponentInput(a), C::SetComponentInput(b)) if a.id == b.id => {
            fold_keyed(&a.change, &b.change, |change| {
                SetComponentInput {
                    id: a.id.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetComponentState(a), C::SetComponentState(b)) if a.id == b.id => {
            fold_keyed(&a.change, &b.change, |change| {
                SetComponentState {
                    id: a.id.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetComponentEvent(a), C::SetComponentEvent(b)) if a.id == b.id => {
            fold_keyed(&a.change, &b.change, |change| {
                SetComponentEvent {
                    id: a.id.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetComponentEditorEvent(a), C::SetComponentEditorEvent(b)) if a.id == b.id => {
            fold_keyed(&a.change, &b.change, |change| {
                SetComponentEditorEvent {
                    id: a.id.clone(),
                    change,
                }
                .into()
            })
        }
        (C::MoveComponent(a), C::MoveComponent(b)) if a.id == b.id => {
            if a.from == b.to {
                Fold::Cancelled
            } else {
                Fold::Into(
                    MoveComponent {
                        id: a.id.clone(),
                        from: a.from.clone(),
                        to: b.to.clone(),
                    }
                    .into(),
                )
            }
        }
        (C::SetCustomStyle(a), C::SetCustomStyle(b))
            if a.id == b.id && a.breakpoint == b.breakpoint && a.pseudo == b.pseudo =>
        {
            fold_keyed(&a.change, &b.change, |change| {
                SetCustomStyle { change, ..a.clone() }.into()
            })
        }
        (C::SetOverrideStyle(a), C::SetOverrideStyle(b))
            if a.id == b.id
                && a.selector == b.selector
                && a.breakpoint == b.breakpoint
                && a.pseudo == b.pseudo =>
        {
            fold_keyed(&a.change, &b.change, |change| {
                SetOverrideStyle { change, ..a.clone() }.into()
            })
        }
        (C::SetMixinEntry(a), C::SetMixinEntry(b))
            if a.style_id == b.style_id && a.breakpoint == b.breakpoint && a.pseudo == b.pseudo =>
        {
            fold_keyed(&a.change, &b.change, |change| {
                SetMixinEntry { change, ..a.clone() }.into()
            })
        }
        (C::UpdateMixinOrder(a), C::UpdateMixinOrder(b)) => fold_values(&a.old, &b.new, |old, new| {
            UpdateMixinOrder { old, new }.into()
        }),
        (C::RenameStyleMixin(a), C::RenameStyleMixin(b)) if a.id == b.id => {
            fold_values(&a.old, &b.new, |old, new| {
                RenameStyleMixin {
                    id: a.id.clone(),
                    old,
                    new,
                }
                .into()
            })
        }
        (C::UpdateBreakpoint(a), C::UpdateBreakpoint(b)) if a.id == b.id => {
            fold_values(&a.old, &b.new, |old, new| {
                UpdateBreakpoint {
                    id: a.id.clone(),
                    old,
                    new,
                }
                .into()
            })
        }
        (C::SetBehavior(a), C::SetBehavior(b))
            if behavior_id(&a.change, true) == behavior_id(&b.change, false) =>
        {
            match a.change.clone().followed_by(b.change.clone()) {
                Some(change) => Fold::Into(SetBehavior { change }.into()),
                None => Fold::Cancelled,
            }
        }
        (C::SetBehaviorArg(a), C::SetBehaviorArg(b)) if a.behavior_id == b.behavior_id => {
            fold_keyed(&a.change, &b.change, |change| {
                SetBehaviorArg {
                    behavior_id: a.behavior_id.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetThemeVariable(a), C::SetThemeVariable(b)) => {
            fold_keyed(&a.change, &b.change, |change| SetThemeVariable { change }.into())
        }
        (C::SetThemeFont(a), C::SetThemeFont(b)) => {
            fold_keyed(&a.change, &b.change, |change| SetThemeFont { change }.into())
        }
        (C::SetGlobalStyle(a), C::SetGlobalStyle(b)) if a.selector == b.selector => {
            fold_keyed(&a.change, &b.change, |change| {
                SetGlobalStyle {
                    selector: a.selector.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetTranslation(a), C::SetTranslation(b)) if a.locale == b.locale => {
            fold_keyed(&a.change, &b.change, |change| {
                SetTranslation {
                    locale: a.locale.clone(),
                    change,
                }
                .into()
            })
        }
        (C::SetPageHead(a), C::SetPageHead(b)) if a.route == b.route && a.applied && b.applied => {
            fold_keyed(&a.change, &b.change, |change| {
                SetPageHead {
                    route: a.route.clone(),
                    change,
                    applied: true,
                }
                .into()
            })
        }
        (C::SetDefaultsHead(a), C::SetDefaultsHead(b)) if a.applied && b.applied => {
            fold_keyed(&a.change, &b.change, |change| {
                SetDefaultsHead {
                    change,
                    applied: true,
                }
                .into()
            })
        }
        (C::SetSiteVersion(a), C::SetSiteVersion(b)) => fold_values(&a.old, &b.new, |old, new| {
            SetSiteVersion { old, new }.into()
        }),
        (C::SetHomePage(a), C::SetHomePage(b)) => {
            if a.old.as_deref() == Some(b.new.as_str()) {
                Fold::Cancelled
            } else {
                Fold::Into(
                    SetHomePage {
                        old: a.old.clone(),
                        new: b.new.clone(),
                    }
                    .into(),
                )
            }
        }
        _ => Fold::Incompatible,
    }
}

/// Append `next` to `prev`, promoting `prev` to a group when needed
pub fn merge(prev: Command, next: Command) -> Command {
    match prev {
        Command::Group(mut group) => {
            group.commands.push(next);
            Command::Group(group)
        }
        single => Command::Group(Group::new(vec![single, next])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Position, SetThemeVariable};

    fn variable(name: &str, old: Option<&str>, new: Option<&str>) -> Command {
        SetThemeVariable {
            change: Change::keyed(name, old.map(String::from), new.map(String::from)).unwrap(),
        }
        .into()
    }

    #[test]
    fn test_single_item_groups_collapse() {
        let inner = variable("a", None, Some("1"));
        let nested = Command::Group(Group::new(vec![Command::Group(Group::new(vec![inner.clone()]))]));
        assert_eq!(optimize_command_group(nested), Some(inner));
        assert_eq!(optimize_command_group(Command::Group(Group::default())), None);

        let empties = Command::Group(Group::new(vec![
            Command::Group(Group::default()),
            Command::Group(Group::default()),
        ]));
        assert_eq!(optimize_command_group(empties), None);
    }

    #[test]
    fn test_fold_keeps_earliest_old_and_latest_new() {
        let first = variable("gap", Some("4px"), Some("8px"));
        let second = variable("gap", Some("8px"), Some("12px"));
        assert_eq!(
            fold(&first, &second),
            Fold::Into(variable("gap", Some("4px"), Some("12px")))
        );
    }

    #[test]
    fn test_fold_back_to_start_cancels() {
        let first = variable("gap", Some("4px"), Some("8px"));
        let second = variable("gap", Some("8px"), Some("4px"));
        assert_eq!(fold(&first, &second), Fold::Cancelled);
    }

    #[test]
    fn test_fold_different_targets_is_incompatible() {
        let first = variable("gap", Some("4px"), Some("8px"));
        let second = variable("margin", Some("0"), Some("1px"));
        assert_eq!(fold(&first, &second), Fold::Incompatible);

        let tag: Command = SetComponentTag {
            id: "c-1".to_string(),
            old: "div".to_string(),
            new: "section".to_string(),
        }
        .into();
        assert_eq!(fold(&first, &tag), Fold::Incompatible);
    }

    #[test]
    fn test_fold_moves() {
        let at = |parent: &str, index| Position {
            parent_id: parent.to_string(),
            index,
        };
        let first: Command = MoveComponent {
            id: "c-3".to_string(),
            from: at("c-1", 0),
            to: at("c-2", 0),
        }
        .into();
        let second: Command = MoveComponent {
            id: "c-3".to_string(),
            from: at("c-2", 0),
            to: at("c-4", 1),
        }
        .into();
        let back: Command = MoveComponent {
            id: "c-3".to_string(),
            from: at("c-2", 0),
            to: at("c-1", 0),
        }
        .into();

        assert_eq!(
            fold(&first, &second),
            Fold::Into(
                MoveComponent {
                    id: "c-3".to_string(),
                    from: at("c-1", 0),
                    to: at("c-4", 1),
                }
                .into()
            )
        );
        assert_eq!(fold(&first, &back), Fold::Cancelled);
    }

    #[test]
    fn test_merge_promotes_to_group() {
        let a = variable("a", None, Some("1"));
        let b = variable("b", None, Some("2"));
        let c = variable("c", None, Some("3"));

        let merged = merge(merge(a.clone(), b.clone()), c.clone());
        assert_eq!(merged, Command::Group(Group::new(vec![a, b, c])));
    }
}

//! # Value-level change payloads
//!
//! Every reversible edit to a keyed collection is described by a [`Change`]:
//! the value before the edit, the value after, or both. Keyed collections use
//! [`Entry`] so the key itself is part of the snapshot, which lets an
//! `Update` rename a key and change its value in one step.
//!
//! Applying a change removes the "before" side and inserts the "after" side.
//! Undo runs the same routine with the sides swapped ([`Direction::Backward`]).
//! Containers emptied by a removal are dropped rather than left as empty
//! husks, so add → remove → undo sequences converge on identical documents.

use serde::{Deserialize, Serialize};
use sitecraft_document::BreakpointStyles;
use std::collections::BTreeMap;

/// Which way a reversible handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Explicit three-state edit: insert, remove, or replace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Change<T> {
    Insert { new: T },
    Remove { old: T },
    Update { old: T, new: T },
}

/// A keyed value snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    pub key: String,
    pub value: V,
}

impl<V> Entry<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<T> Change<T> {
    /// Build a change from optional snapshots. `(None, None)` describes no
    /// change at all and yields `None`.
    pub fn between(old: Option<T>, new: Option<T>) -> Option<Self> {
        match (old, new) {
            (None, None) => None,
            (None, Some(new)) => Some(Change::Insert { new }),
            (Some(old), None) => Some(Change::Remove { old }),
            (Some(old), Some(new)) => Some(Change::Update { old, new }),
        }
    }

    pub fn before(&self) -> Option<&T> {
        match self {
            Change::Insert { .. } => None,
            Change::Remove { old } | Change::Update { old, .. } => Some(old),
        }
    }

    pub fn after(&self) -> Option<&T> {
        match self {
            Change::Remove { .. } => None,
            Change::Insert { new } | Change::Update { new, .. } => Some(new),
        }
    }

    /// `(to_remove, to_insert)` when running in `direction`
    pub fn sides(&self, direction: Direction) -> (Option<&T>, Option<&T>) {
        match direction {
            Direction::Forward => (self.before(), self.after()),
            Direction::Backward => (self.after(), self.before()),
        }
    }

    pub fn into_parts(self) -> (Option<T>, Option<T>) {
        match self {
            Change::Insert { new } => (None, Some(new)),
            Change::Remove { old } => (Some(old), None),
            Change::Update { old, new } => (Some(old), Some(new)),
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Change::Insert { new } => Change::Remove { old: new },
            Change::Remove { old } => Change::Insert { new: old },
            Change::Update { old, new } => Change::Update { old: new, new: old },
        }
    }
}

impl<T: PartialEq> Change<T> {
    /// Collapse `self` followed by `next` into one change that keeps the
    /// earliest "before" and the latest "after". `None` when the pair has no
    /// net effect.
    pub fn followed_by(self, next: Self) -> Option<Self> {
        let (old, _) = self.into_parts();
        let (_, new) = next.into_parts();
        match Change::between(old, new)? {
            Change::Update { old, new } if old == new => None,
            change => Some(change),
        }
    }
}

impl<V> Change<Entry<V>> {
    /// Change of a single key from `old` to `new`
    pub fn keyed(key: impl Into<String>, old: Option<V>, new: Option<V>) -> Option<Self> {
        let key = key.into();
        Change::between(
            old.map(|value| Entry::new(key.clone(), value)),
            new.map(|value| Entry::new(key, value)),
        )
    }

    /// Key addressed before the change
    pub fn before_key(&self) -> &str {
        match self {
            Change::Insert { new } => &new.key,
            Change::Remove { old } | Change::Update { old, .. } => &old.key,
        }
    }

    /// Key addressed after the change
    pub fn after_key(&self) -> &str {
        match self {
            Change::Remove { old } => &old.key,
            Change::Insert { new } | Change::Update { new, .. } => &new.key,
        }
    }

    /// True when `next` picks up where `self` left off
    pub fn lines_up_with(&self, next: &Self) -> bool {
        self.after_key() == next.before_key()
    }
}

/// Apply a keyed change to a flat map
pub(crate) fn apply_entry<V: Clone>(
    map: &mut BTreeMap<String, V>,
    change: &Change<Entry<V>>,
    direction: Direction,
) {
    let (removed, inserted) = change.sides(direction);
    if let Some(old) = removed {
        map.remove(&old.key);
    }
    if let Some(new) = inserted {
        map.insert(new.key.clone(), new.value.clone());
    }
}

/// Apply a keyed change one level down, dropping the inner map when emptied
pub(crate) fn apply_nested_entry<V: Clone>(
    map: &mut BTreeMap<String, BTreeMap<String, V>>,
    outer: &str,
    change: &Change<Entry<V>>,
    direction: Direction,
) {
    let (removed, inserted) = change.sides(direction);
    if let Some(old) = removed {
        if let Some(inner) = map.get_mut(outer) {
            inner.remove(&old.key);
            if inner.is_empty() {
                map.remove(outer);
            }
        }
    }
    if let Some(new) = inserted {
        map.entry(outer.to_string())
            .or_default()
            .insert(new.key.clone(), new.value.clone());
    }
}

/// Apply a property change inside `breakpoint → pseudo → property → value`
pub(crate) fn apply_style_entry(
    styles: &mut BreakpointStyles,
    breakpoint: &str,
    pseudo: &str,
    change: &Change<Entry<String>>,
    direction: Direction,
) {
    let (removed, inserted) = change.sides(direction);
    if let Some(old) = removed {
        remove_style_property(styles, breakpoint, pseudo, &old.key);
    }
    if let Some(new) = inserted {
        styles
            .entry(breakpoint.to_string())
            .or_default()
            .entry(pseudo.to_string())
            .or_default()
            .insert(new.key.clone(), new.value.clone());
    }
}

fn remove_style_property(styles: &mut BreakpointStyles, breakpoint: &str, pseudo: &str, property: &str) {
    let Some(pseudos) = styles.get_mut(breakpoint) else {
        return;
    };
    if let Some(properties) = pseudos.get_mut(pseudo) {
        properties.remove(property);
        if properties.is_empty() {
            pseudos.remove(pseudo);
        }
    }
    if pseudos.is_empty() {
        styles.remove(breakpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_presence_pattern() {
        assert_eq!(Change::<u8>::between(None, None), None);
        assert_eq!(Change::between(None, Some(1)), Some(Change::Insert { new: 1 }));
        assert_eq!(Change::between(Some(1), None), Some(Change::Remove { old: 1 }));
        assert_eq!(
            Change::between(Some(1), Some(2)),
            Some(Change::Update { old: 1, new: 2 })
        );
    }

    #[test]
    fn test_inverted_swaps_sides() {
        let change = Change::Update { old: "a", new: "b" };
        assert_eq!(change.inverted(), Change::Update { old: "b", new: "a" });
        assert_eq!(Change::Insert { new: 3 }.inverted(), Change::Remove { old: 3 });
    }

    #[test]
    fn test_followed_by_keeps_earliest_before() {
        let first = Change::Update { old: 1, new: 2 };
        let second = Change::Update { old: 2, new: 5 };
        assert_eq!(first.followed_by(second), Some(Change::Update { old: 1, new: 5 }));

        // Insert then remove nets out
        let inserted = Change::Insert { new: 7 };
        assert_eq!(inserted.followed_by(Change::Remove { old: 7 }), None);

        // Back to the original value nets out
        let there = Change::Update { old: 1, new: 2 };
        assert_eq!(there.followed_by(Change::Update { old: 2, new: 1 }), None);
    }

    #[test]
    fn test_entry_update_renames_key() {
        let mut map = BTreeMap::from([("count".to_string(), 1)]);
        let change = Change::Update {
            old: Entry::new("count", 1),
            new: Entry::new("total", 2),
        };

        apply_entry(&mut map, &change, Direction::Forward);
        assert_eq!(map, BTreeMap::from([("total".to_string(), 2)]));

        apply_entry(&mut map, &change, Direction::Backward);
        assert_eq!(map, BTreeMap::from([("count".to_string(), 1)]));
    }

    #[test]
    fn test_style_entry_collapses_empty_containers() {
        let mut styles = BreakpointStyles::new();
        let change = Change::keyed("color", None, Some("red".to_string())).unwrap();

        apply_style_entry(&mut styles, "bp-1", "hover", &change, Direction::Forward);
        assert_eq!(styles["bp-1"]["hover"]["color"], "red");

        apply_style_entry(&mut styles, "bp-1", "hover", &change, Direction::Backward);
        assert!(styles.is_empty());
    }

    #[test]
    fn test_keys_line_up_across_renames() {
        let rename = Change::Update {
            old: Entry::new("a", 1),
            new: Entry::new("b", 1),
        };
        let edit = Change::keyed("b", Some(1), Some(2)).unwrap();
        let unrelated = Change::keyed("c", Some(1), Some(2)).unwrap();

        assert!(rename.lines_up_with(&edit));
        assert!(!rename.lines_up_with(&unrelated));
    }
}

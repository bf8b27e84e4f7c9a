//! End-to-end history scenarios
//!
//! This tests:
//! - Id allocator conservation across nested adds
//! - Precedence order restoration for style mixins
//! - Group ordering on undo and atomic failure
//! - Tree add/remove/undo snapshots
//! - Coalesced edits as single undo steps

use serde_json::Value;
use sitecraft_editor::commands::{
    AddComponent, AddStyleMixin, ComponentSpec, RemoveComponent, RemovePage, RemoveStyleMixin,
    SetCustomStyle, SetMixinEntry, SetThemeVariable,
};
use sitecraft_editor::document::{IdKind, Site};
use sitecraft_editor::{Command, Editor, Group};

fn snapshot(site: &Site) -> String {
    serde_json::to_string(site).unwrap()
}

/// Page root with two children
fn two_children() -> (Editor, String, String) {
    let mut editor = Editor::new();
    let root = editor.site().pages["/"].root.clone();
    editor
        .push(AddComponent::new(&root, ComponentSpec::new("header")).into())
        .unwrap();
    let second = editor.site().context.ids.peek(IdKind::Component);
    editor
        .push(AddComponent::new(&root, ComponentSpec::new("main")).into())
        .unwrap();
    (editor, root, second)
}

fn add_mixin(editor: &mut Editor, name: &str) -> String {
    let id = editor.site().context.ids.peek(IdKind::Style);
    editor.push(AddStyleMixin::new(name).into()).unwrap();
    id
}

#[test]
fn test_nested_add_undo_conserves_counter() {
    let (mut editor, root, _) = two_children();
    let counter = editor.site().context.ids.next_id();

    let spec = ComponentSpec::new("ul")
        .with_child(ComponentSpec::new("li").with_content("One"))
        .with_child(ComponentSpec::new("li").with_child(ComponentSpec::new("a").with_content("Two")));
    editor.push(AddComponent::new(&root, spec).into()).unwrap();
    assert_eq!(editor.site().context.ids.next_id(), counter + 4);

    editor.undo().unwrap();
    assert_eq!(editor.site().context.ids.next_id(), counter);

    // Redo mints the same ids again
    editor.redo().unwrap();
    assert!(editor.site().component(&format!("c-site-{}", counter + 4)).is_some());
}

#[test]
fn test_many_nested_adds_undone_in_reverse_conserve_counter() {
    let (mut editor, root, second) = two_children();
    let counter = editor.site().context.ids.next_id();
    let before = snapshot(editor.site());

    // Later specs land under components minted by earlier pushes
    let list = editor.site().context.ids.peek(IdKind::Component);
    let specs = [
        (root.clone(), ComponentSpec::new("ul").with_child(ComponentSpec::new("li").with_content("One"))),
        (list.clone(), ComponentSpec::new("li").with_child(ComponentSpec::new("a").with_content("Two"))),
        (second, ComponentSpec::new("section").with_child(ComponentSpec::new("h2"))),
        (list, ComponentSpec::new("li")),
    ];
    let pushes = specs.len();
    for (parent, spec) in specs {
        editor.push(AddComponent::new(&parent, spec).into()).unwrap();
    }
    assert_eq!(editor.site().context.ids.next_id(), counter + 7);

    assert_eq!(editor.undo_n(pushes).unwrap(), pushes);
    assert_eq!(editor.site().context.ids.next_id(), counter);
    assert_eq!(snapshot(editor.site()), before);
}

#[test]
fn test_failed_group_push_leaves_site_and_history_alone() {
    let (mut editor, root, _) = two_children();
    let before = snapshot(editor.site());
    let levels = editor.history().undo_levels();

    let group = Group::new(vec![
        SetThemeVariable::set(editor.site(), "accent", Some("red")).unwrap().into(),
        AddComponent::new(&root, ComponentSpec::new("aside")).into(),
        RemovePage::new("/").into(),
    ]);
    assert!(editor.push(Command::Group(group)).is_err());

    assert_eq!(snapshot(editor.site()), before);
    assert_eq!(editor.history().undo_levels(), levels);
}

#[test]
fn test_duplicate_undo_conserves_counter() {
    let (mut editor, root, second) = two_children();
    editor
        .push(AddComponent::new(&second, ComponentSpec::new("p").with_content("Copy me")).into())
        .unwrap();
    let before = snapshot(editor.site());

    editor
        .push(AddComponent::duplicate(&root, &second).into())
        .unwrap();
    assert_eq!(editor.site().component_count(), 6);

    editor.undo().unwrap();
    assert_eq!(snapshot(editor.site()), before);
}

#[test]
fn test_tree_add_remove_undo() {
    let (mut editor, _, second) = two_children();
    let base_count = editor.site().component_count();
    let before = snapshot(editor.site());

    let leaf = editor.site().context.ids.peek(IdKind::Component);
    editor
        .push(AddComponent::new(&second, ComponentSpec::new("span").with_content("new")).into())
        .unwrap();
    assert_eq!(editor.site().component_count(), base_count + 1);

    editor.push(RemoveComponent::new(&leaf).into()).unwrap();
    assert_eq!(editor.site().component_count(), base_count);

    // Removal keeps the consumed id, so compare without the counter
    let mut removed: Value = serde_json::to_value(editor.site()).unwrap();
    let mut original: Value = serde_json::from_str(&before).unwrap();
    removed["context"].as_object_mut().unwrap().remove("nextId");
    original["context"].as_object_mut().unwrap().remove("nextId");
    assert_eq!(removed, original);

    // Undoing both is byte-identical, counter included
    editor.undo_n(2).unwrap();
    assert_eq!(snapshot(editor.site()), before);
}

#[test]
fn test_remove_style_mixin_restores_position() {
    for position in 0..3 {
        let mut editor = Editor::new();
        let ids: Vec<String> = ["Base", "Accent", "Muted"]
            .into_iter()
            .map(|name| add_mixin(&mut editor, name))
            .collect();
        let order = editor.site().context.style_order.clone();
        assert_eq!(order, ids);

        editor
            .push(RemoveStyleMixin::new(&ids[position]).into())
            .unwrap();
        assert_eq!(editor.site().context.style_order.len(), 2);
        assert!(!editor.site().context.style_order.contains(&ids[position]));

        editor.undo().unwrap();
        assert_eq!(editor.site().context.style_order, order, "position {position}");
    }
}

#[test]
fn test_style_precedence_scenario() {
    let mut editor = Editor::new();
    let default = add_mixin(&mut editor, "Default");
    editor.clear_history();

    for name in ["One", "Two", "Three"] {
        add_mixin(&mut editor, name);
    }
    let original = editor.site().context.style_order.clone();
    assert_eq!(original.len(), 4);
    assert_eq!(original[0], default);

    let first = original[0].clone();
    let second = original[1].clone();
    editor.push(RemoveStyleMixin::new(&first).into()).unwrap();
    editor.push(RemoveStyleMixin::new(&second).into()).unwrap();
    assert_eq!(editor.site().context.style_order.len(), 2);

    // Second removal first, then the first
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.site().context.style_order, original);
}

#[test]
fn test_mixin_entry_round_trip() {
    let mut editor = Editor::new();
    let id = add_mixin(&mut editor, "Card");
    let before = snapshot(editor.site());

    let set = SetMixinEntry::set(editor.site(), &id, "default", "hover", "box-shadow", Some("0 1px 2px")).unwrap();
    editor.push(set.into()).unwrap();
    assert_eq!(
        editor.site().context.styles[&id].breakpoints["default"]["hover"]["box-shadow"],
        "0 1px 2px"
    );

    editor.undo().unwrap();
    assert_eq!(snapshot(editor.site()), before);
}

#[test]
fn test_group_undoes_style_before_component() {
    let (mut editor, root, _) = two_children();
    let before = snapshot(editor.site());
    let card = editor.site().context.ids.peek(IdKind::Component);

    let group = Group::new(vec![
        AddComponent::new(&root, ComponentSpec::new("div")).into(),
        SetCustomStyle {
            id: card.clone(),
            breakpoint: "default".to_string(),
            pseudo: "default".to_string(),
            change: sitecraft_editor::Change::keyed("padding", None, Some("8px".to_string())).unwrap(),
        }
        .into(),
    ])
    .described("Insert card");
    editor.push(Command::Group(group)).unwrap();
    assert_eq!(
        editor.site().component(&card).unwrap().style.custom["default"]["default"]["padding"],
        "8px"
    );
    assert_eq!(editor.history().undo_description().as_deref(), Some("Insert card"));

    editor.undo().unwrap();
    assert_eq!(snapshot(editor.site()), before);

    editor.redo().unwrap();
    assert_eq!(
        editor.site().component(&card).unwrap().style.custom["default"]["default"]["padding"],
        "8px"
    );
}

#[test]
fn test_replace_pushes_coalesce_into_one_step() {
    let (mut editor, root, _) = two_children();
    let levels = editor.history().undo_levels();
    let before = snapshot(editor.site());

    for px in ["1px", "2px", "3px"] {
        let command = SetCustomStyle::set(editor.site(), &root, "default", "default", "gap", Some(px)).unwrap();
        editor.push_replace(command.into()).unwrap();
    }
    assert_eq!(editor.history().undo_levels(), levels + 1);

    editor.undo().unwrap();
    assert_eq!(snapshot(editor.site()), before);
}

#[test]
fn test_undo_redo_counts() {
    let (mut editor, root, _) = two_children();
    for tag in ["p", "p", "p"] {
        editor
            .push(AddComponent::new(&root, ComponentSpec::new(tag)).into())
            .unwrap();
    }
    assert_eq!(editor.undo_n(10).unwrap(), 5);
    assert_eq!(editor.site().component_count(), 1);
    assert_eq!(editor.redo_n(2).unwrap(), 2);
    assert_eq!(editor.site().component_count(), 3);
    assert_eq!(editor.history().redo_levels(), 3);
}

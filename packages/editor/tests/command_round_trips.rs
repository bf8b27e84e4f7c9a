//! Every command kind applied, undone and redone against a populated site.
//!
//! After `undo` the site must serialize byte-for-byte as before the push;
//! after `redo` it must match the state right after the push.

use serde_json::json;
use sitecraft_editor::commands::*;
use sitecraft_editor::document::{BehaviorRef, Font, HeadTag, IdKind, Site};
use sitecraft_editor::{Change, Command, Editor, Entry};

struct Fixture {
    editor: Editor,
    root: String,
    list: String,
    item: String,
    mixin: String,
    breakpoint: String,
    behavior: String,
}

fn peek(editor: &Editor, kind: IdKind) -> String {
    editor.site().context.ids.peek(kind)
}

/// body > [ul > li("First"), p]
fn fixture() -> Fixture {
    let mut editor = Editor::new();
    let root = editor.site().pages["/"].root.clone();

    let list = peek(&editor, IdKind::Component);
    let item = format!("c-site-{}", editor.site().context.ids.next_id() + 2);
    let spec = ComponentSpec::new("ul").with_child(ComponentSpec::new("li").with_content("First"));
    editor.push(AddComponent::new(&root, spec).into()).unwrap();
    editor
        .push(AddComponent::new(&root, ComponentSpec::new("p").with_content("Text")).into())
        .unwrap();

    let mixin = peek(&editor, IdKind::Style);
    editor.push(AddStyleMixin::new("Card").into()).unwrap();
    editor.push(AddComponentMixin::new(&list, &mixin).into()).unwrap();

    let breakpoint = peek(&editor, IdKind::Breakpoint);
    editor
        .push(AddBreakpoint::new("Tablet", Some(768), Some(1023)).into())
        .unwrap();

    let behavior = peek(&editor, IdKind::Behavior);
    editor
        .push(AddBehavior::new("Track", "console.log(args)").into())
        .unwrap();

    editor.clear_history();
    Fixture {
        editor,
        root,
        list,
        item,
        mixin,
        breakpoint,
        behavior,
    }
}

fn json(site: &Site) -> String {
    serde_json::to_string(site).unwrap()
}

/// Push, undo, redo; checks both snapshots
fn round_trip(editor: &mut Editor, command: impl Into<Command>) {
    let command = command.into();
    let kind = command.kind();
    let before = json(editor.site());

    editor.push(command).unwrap();
    let after = json(editor.site());
    assert_ne!(before, after, "{kind} changed nothing");

    assert!(editor.undo().unwrap());
    assert_eq!(json(editor.site()), before, "{kind} undo");

    assert!(editor.redo().unwrap());
    assert_eq!(json(editor.site()), after, "{kind} redo");
}

#[test]
fn test_component_commands() {
    let Fixture {
        mut editor,
        root,
        list,
        item,
        ..
    } = fixture();

    round_trip(&mut editor, AddComponent::new(&root, ComponentSpec::new("hr")).at(0));
    round_trip(&mut editor, AddComponent::duplicate(&root, &list));
    let moved = MoveComponent::capture(editor.site(), &item, &root, 0).unwrap();
    round_trip(&mut editor, moved);

    round_trip(
        &mut editor,
        SetComponentTag {
            id: item.clone(),
            old: "li".to_string(),
            new: "div".to_string(),
        },
    );
    round_trip(
        &mut editor,
        SetComponentContent {
            id: item.clone(),
            change: Change::Update {
                old: "First".to_string(),
                new: "Second".to_string(),
            },
        },
    );
    round_trip(
        &mut editor,
        SetComponentInput {
            id: item.clone(),
            change: Change::Insert {
                new: Entry::new("href", json!("/about")),
            },
        },
    );
    let command = SetComponentState::capture(editor.site(), &item, "open", Some(json!(true))).unwrap();
    round_trip(&mut editor, command);
    round_trip(
        &mut editor,
        SetComponentEvent {
            id: item.clone(),
            change: Change::Insert {
                new: Entry::new("click", vec![BehaviorRef::new("builtin:show")]),
            },
        },
    );
    round_trip(
        &mut editor,
        SetComponentEditorEvent {
            id: item.clone(),
            change: Change::Insert {
                new: Entry::new("self-added", vec![BehaviorRef::new("builtin:scroll-to")]),
            },
        },
    );
    round_trip(&mut editor, MarkCustomComponent::new(&list, true));
    round_trip(&mut editor, RemoveComponent::new(&list));
}

#[test]
fn test_custom_instance_round_trip() {
    let Fixture {
        mut editor,
        root,
        list,
        ..
    } = fixture();
    editor.push(MarkCustomComponent::new(&list, true).into()).unwrap();
    round_trip(&mut editor, AddComponent::custom_instance(&root, &list));
}

#[test]
fn test_style_commands() {
    let Fixture {
        mut editor,
        root,
        list,
        mixin,
        breakpoint,
        ..
    } = fixture();

    let command = SetCustomStyle::set(editor.site(), &list, &breakpoint, "hover", "color", Some("red")).unwrap();
    round_trip(&mut editor, command);
    round_trip(
        &mut editor,
        SetOverrideStyle {
            id: list.clone(),
            selector: "> li".to_string(),
            breakpoint: "default".to_string(),
            pseudo: "default".to_string(),
            change: Change::keyed("margin", None, Some("0".to_string())).unwrap(),
        },
    );
    let command = SetMixinEntry::set(editor.site(), &mixin, "default", "default", "display", Some("grid")).unwrap();
    round_trip(&mut editor, command);
    round_trip(&mut editor, AddComponentMixin::new(&root, &mixin));

    let other = peek(&editor, IdKind::Style);
    editor.push(AddStyleMixin::new("Other").into()).unwrap();
    round_trip(&mut editor, ReplaceComponentMixin::new(&list, &mixin, &other));
    round_trip(&mut editor, RemoveComponentMixin::new(&list, &other));
    round_trip(&mut editor, AddStyleMixin::new("Third"));

    let mut reversed = editor.site().context.style_order.clone();
    reversed.reverse();
    let command = UpdateMixinOrder::to(editor.site(), reversed);
    round_trip(&mut editor, command);
    round_trip(
        &mut editor,
        RenameStyleMixin {
            id: mixin.clone(),
            old: "Card".to_string(),
            new: "Panel".to_string(),
        },
    );
    round_trip(&mut editor, RemoveStyleMixin::new(&mixin));

    round_trip(&mut editor, AddBreakpoint::new("Wide", Some(1440), None));
    let command = UpdateBreakpoint::capture(editor.site(), &breakpoint, "Tablet", Some(600), Some(1023)).unwrap();
    round_trip(&mut editor, command);
    round_trip(&mut editor, RemoveBreakpoint::new(&breakpoint));
}

#[test]
fn test_site_commands() {
    let Fixture {
        mut editor,
        behavior,
        ..
    } = fixture();

    round_trip(&mut editor, AddBehavior::new("Notify", "alert(args.text)"));
    let existing = editor.site().context.behaviors[&behavior].clone();
    let mut renamed = existing.clone();
    renamed.name = "Track click".to_string();
    round_trip(
        &mut editor,
        SetBehavior {
            change: Change::Update {
                old: existing,
                new: renamed,
            },
        },
    );
    round_trip(
        &mut editor,
        SetBehaviorArg {
            behavior_id: behavior.clone(),
            change: Change::Insert {
                new: Entry::new("event", json!("click")),
            },
        },
    );
    let command = SetThemeVariable::set(editor.site(), "accent", Some("#0af")).unwrap();
    round_trip(&mut editor, command);
    round_trip(
        &mut editor,
        SetThemeFont {
            change: Change::Insert {
                new: Entry::new(
                    "body",
                    Font {
                        family: "Inter".to_string(),
                        source: None,
                        weights: vec![400, 700],
                    },
                ),
            },
        },
    );
    round_trip(
        &mut editor,
        SetGlobalStyle {
            selector: "a".to_string(),
            change: Change::keyed("color", None, Some("inherit".to_string())).unwrap(),
        },
    );
    let command = SetTranslation::set(editor.site(), "fr", "hello", Some("Bonjour")).unwrap();
    round_trip(&mut editor, command);
    round_trip(
        &mut editor,
        SetPageHead::new(
            "/",
            Change::Insert {
                new: Entry::new("title", HeadTag::new("title")),
            },
        ),
    );
    round_trip(
        &mut editor,
        SetDefaultsHead::new(Change::Insert {
            new: Entry::new(
                "viewport",
                HeadTag::new("meta").with_attribute("name", "viewport"),
            ),
        }),
    );
    round_trip(&mut editor, SetSiteVersion::new("3", "4"));
}

#[test]
fn test_page_commands() {
    let Fixture { mut editor, .. } = fixture();

    round_trip(&mut editor, AddPage::new("/about", "About"));
    editor.push(AddPage::new("/blog", "Blog").into()).unwrap();

    let meta = PageMeta {
        route: "/journal".to_string(),
        name: "Journal".to_string(),
        public: false,
    };
    let command = EditPage::capture(editor.site(), "/blog", meta).unwrap();
    round_trip(&mut editor, command);
    round_trip(&mut editor, RemovePage::new("/"));
    let command = SetHomePage::to(editor.site(), "/journal");
    round_trip(&mut editor, command);
}

#[test]
fn test_group_round_trip() {
    let Fixture {
        mut editor,
        root,
        mixin,
        ..
    } = fixture();
    let heading = peek(&editor, IdKind::Component);

    let group = Group::new(vec![
        AddComponent::new(&root, ComponentSpec::new("h1").with_content("Title")).into(),
        AddComponentMixin::new(&heading, &mixin).into(),
        SetThemeVariable::set(editor.site(), "gap", Some("4px")).unwrap().into(),
    ]);
    round_trip(&mut editor, Command::Group(group));
}

#[test]
fn test_history_survives_json() {
    let Fixture {
        mut editor, list, ..
    } = fixture();
    editor.push(RemoveComponent::new(&list).into()).unwrap();
    editor.push(AddPage::new("/faq", "FAQ").into()).unwrap();
    editor.undo().unwrap();

    let encoded = serde_json::to_value(editor.history()).unwrap();
    assert_eq!(encoded["back"].as_array().unwrap().len(), 1);
    assert_eq!(encoded["back"][0]["kind"], "RemoveComponent");
    assert_eq!(encoded["forward"][0]["kind"], "AddPage");

    // Captured undo state travels with the command
    let removed = &encoded["back"][0]["data"]["removed"];
    assert_eq!(removed["nodes"].as_array().unwrap().len(), 2);
}

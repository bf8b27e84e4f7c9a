//! Site-global data: behaviors, theme, translations, head tags and the
//! schema version tag.

use crate::change::{apply_entry, apply_nested_entry, Change, Direction, Entry};
use crate::command_trait::CommandOp;
use crate::dispatch::CommandContext;
use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitecraft_document::{Behavior, Font, HeadTag, IdKind, Site};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBehavior {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl AddBehavior {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            args: BTreeMap::new(),
            created: None,
        }
    }
}

impl CommandOp for AddBehavior {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        let ctx = &mut cx.site.context;
        let id = ctx.ids.new_id(IdKind::Behavior);
        ctx.behaviors.insert(
            id.clone(),
            Behavior {
                id: id.clone(),
                name: self.name.clone(),
                code: self.code.clone(),
                args: self.args.clone(),
            },
        );
        self.created = Some(id);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if let Some(id) = self.created.take() {
            let ctx = &mut cx.site.context;
            ctx.behaviors.remove(&id);
            ctx.ids.release(1);
        }
        Ok(())
    }
}

/// Insert, remove or replace a whole behavior, keyed by its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBehavior {
    pub change: Change<Behavior>,
}

impl SetBehavior {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        let behaviors = &mut cx.site.context.behaviors;
        let (removed, inserted) = self.change.sides(direction);
        if let Some(old) = removed {
            behaviors.remove(&old.id);
        }
        if let Some(new) = inserted {
            behaviors.insert(new.id.clone(), new.clone());
        }
    }
}

impl CommandOp for SetBehavior {
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
#[serde(rename_all = "camelCase")]
pub struct SetBehaviorArg {
    pub behavior_id: String,
    pub change: Change<Entry<Value>>,
}

impl SetBehaviorArg {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(behavior) = cx.site.context.behaviors.get_mut(&self.behavior_id) {
            apply_entry(&mut behavior.args, &self.change, direction);
        }
    }
}

impl CommandOp for SetBehaviorArg {
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
pub struct SetThemeVariable {
    pub change: Change<Entry<String>>,
}

impl SetThemeVariable {
    pub fn set(site: &Site, name: &str, value: Option<&str>) -> Option<Self> {
        let old = site.context.theme.variables.get(name).cloned();
        Some(Self {
            change: Change::keyed(name, old, value.map(str::to_string))?,
        })
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        apply_entry(&mut cx.site.context.theme.variables, &self.change, direction);
    }
}

impl CommandOp for SetThemeVariable {
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
pub struct SetThemeFont {
    pub change: Change<Entry<Font>>,
}

impl SetThemeFont {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        apply_entry(&mut cx.site.context.theme.fonts, &self.change, direction);
    }
}

impl CommandOp for SetThemeFont {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

/// One property of a site-wide selector rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetGlobalStyle {
    pub selector: String,
    pub change: Change<Entry<String>>,
}

impl SetGlobalStyle {
    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        apply_nested_entry(
            &mut cx.site.context.theme.global_styles,
            &self.selector,
            &self.change,
            direction,
        );
    }
}

impl CommandOp for SetGlobalStyle {
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
pub struct SetTranslation {
    pub locale: String,
    pub change: Change<Entry<String>>,
}

impl SetTranslation {
    pub fn set(site: &Site, locale: &str, key: &str, text: Option<&str>) -> Option<Self> {
        let old = site
            .context
            .i18n
            .get(locale)
            .and_then(|texts| texts.get(key))
            .cloned();
        Some(Self {
            locale: locale.to_string(),
            change: Change::keyed(key, old, text.map(str::to_string))?,
        })
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        apply_nested_entry(&mut cx.site.context.i18n, &self.locale, &self.change, direction);
    }
}

impl CommandOp for SetTranslation {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.run(cx, Direction::Backward);
        Ok(())
    }
}

fn head_is_well_formed(change: &Change<Entry<HeadTag>>) -> bool {
    change.after().map_or(true, |entry| entry.value.is_well_formed())
}

/// Head tag of a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPageHead {
    pub route: String,
    pub change: Change<Entry<HeadTag>>,
    /// False when the last apply ignored the change
    #[serde(default)]
    pub applied: bool,
}

impl SetPageHead {
    pub fn new(route: impl Into<String>, change: Change<Entry<HeadTag>>) -> Self {
        Self {
            route: route.into(),
            change,
            applied: false,
        }
    }

    fn run(&self, cx: &mut CommandContext<'_>, direction: Direction) {
        if let Some(page) = cx.site.page_mut(&self.route) {
            apply_entry(&mut page.head, &self.change, direction);
        }
    }
}

impl CommandOp for SetPageHead {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.applied = head_is_well_formed(&self.change);
        if !self.applied {
            warn!(route = %self.route, key = self.change.after_key(), "Ignoring malformed head tag");
            return Ok(());
        }
        self.run(cx, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if self.applied {
            self.run(cx, Direction::Backward);
        }
        Ok(())
    }
}

/// Head tag emitted on every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDefaultsHead {
    pub change: Change<Entry<HeadTag>>,
    #[serde(default)]
    pub applied: bool,
}

impl SetDefaultsHead {
    pub fn new(change: Change<Entry<HeadTag>>) -> Self {
        Self {
            change,
            applied: false,
        }
    }
}

impl CommandOp for SetDefaultsHead {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.applied = head_is_well_formed(&self.change);
        if !self.applied {
            warn!(key = self.change.after_key(), "Ignoring malformed default head tag");
            return Ok(());
        }
        apply_entry(&mut cx.site.defaults.head, &self.change, Direction::Forward);
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        if self.applied {
            apply_entry(&mut cx.site.defaults.head, &self.change, Direction::Backward);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSiteVersion {
    pub old: String,
    pub new: String,
}

impl SetSiteVersion {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl CommandOp for SetSiteVersion {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        cx.site.version = self.new.clone();
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        cx.site.version = self.old.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NoopHooks;

    #[test]
    fn test_malformed_head_tag_is_ignored() {
        let mut site = Site::new("t");
        let before = site.clone();
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let change = Change::keyed("broken", None, Some(HeadTag::new("  "))).unwrap();
        let mut command = SetPageHead::new("/", change);
        command.apply(&mut cx).unwrap();
        assert!(!command.applied);
        command.undo(&mut cx).unwrap();
        assert_eq!(*cx.site, before);
    }

    #[test]
    fn test_default_head_round_trip() {
        let mut site = Site::new("t");
        let before = site.clone();
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let tag = HeadTag::new("meta").with_attribute("charset", "utf-8");
        let mut command = SetDefaultsHead::new(Change::keyed("charset", None, Some(tag)).unwrap());
        command.apply(&mut cx).unwrap();
        assert_eq!(cx.site.defaults.head["charset"].tag, "meta");

        command.undo(&mut cx).unwrap();
        assert_eq!(*cx.site, before);
    }

    #[test]
    fn test_translation_collapses_locale() {
        let mut site = Site::new("t");
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let mut add = SetTranslation::set(cx.site, "fr", "hello", Some("bonjour")).unwrap();
        add.apply(&mut cx).unwrap();
        assert_eq!(cx.site.context.i18n["fr"]["hello"], "bonjour");

        add.undo(&mut cx).unwrap();
        assert!(cx.site.context.i18n.is_empty());
    }

    #[test]
    fn test_behavior_replace_and_rename_arg() {
        let mut site = Site::new("t");
        let mut hooks = NoopHooks;
        let mut cx = CommandContext::new(&mut site, None, &mut hooks);

        let mut add = AddBehavior::new("Toggle", "el.toggle()");
        add.args.insert("speed".to_string(), Value::from(200));
        add.apply(&mut cx).unwrap();
        let id = add.created.clone().unwrap();

        let mut rename = SetBehaviorArg {
            behavior_id: id.clone(),
            change: Change::Update {
                old: Entry::new("speed", Value::from(200)),
                new: Entry::new("duration", Value::from(300)),
            },
        };
        rename.apply(&mut cx).unwrap();
        let args = &cx.site.context.behaviors[&id].args;
        assert!(!args.contains_key("speed"));
        assert_eq!(args["duration"], Value::from(300));

        rename.undo(&mut cx).unwrap();
        assert_eq!(cx.site.context.behaviors[&id].args["speed"], Value::from(200));
    }
}

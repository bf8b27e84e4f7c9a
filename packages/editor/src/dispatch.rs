//! # Dispatcher
//!
//! Routes a [`Command`] to its payload's apply/undo handler. Both matches are
//! exhaustive, so adding a command kind without handlers does not compile.

use crate::command_trait::CommandOp;
use crate::commands::{Command, Group};
use crate::editor_state::EditorState;
use crate::errors::EditorResult;
use crate::hooks::EditorHooks;
use sitecraft_document::Site;
use tracing::{debug, warn};

/// Everything a handler may touch while it runs
pub struct CommandContext<'a> {
    pub site: &'a mut Site,
    pub state: Option<&'a mut EditorState>,
    pub hooks: &'a mut dyn EditorHooks,
    /// Set while redoing; one-shot hooks stay quiet
    pub replay: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        site: &'a mut Site,
        state: Option<&'a mut EditorState>,
        hooks: &'a mut dyn EditorHooks,
    ) -> Self {
        Self {
            site,
            state,
            hooks,
            replay: false,
        }
    }

    pub fn replaying(mut self) -> Self {
        self.replay = true;
        self
    }
}

pub fn apply(command: &mut Command, cx: &mut CommandContext<'_>) -> EditorResult<()> {
    debug!(command = command.kind(), replay = cx.replay, "apply");
    match command {
        Command::AddComponent(c) => c.apply(cx),
        Command::RemoveComponent(c) => c.apply(cx),
        Command::MoveComponent(c) => c.apply(cx),
        Command::SetComponentTag(c) => c.apply(cx),
        Command::SetComponentContent(c) => c.apply(cx),
        Command::SetComponentInput(c) => c.apply(cx),
        Command::SetComponentState(c) => c.apply(cx),
        Command::SetComponentEvent(c) => c.apply(cx),
        Command::SetComponentEditorEvent(c) => c.apply(cx),
        Command::MarkCustomComponent(c) => c.apply(cx),
        Command::SetCustomStyle(c) => c.apply(cx),
        Command::SetOverrideStyle(c) => c.apply(cx),
        Command::SetMixinEntry(c) => c.apply(cx),
        Command::AddComponentMixin(c) => c.apply(cx),
        Command::RemoveComponentMixin(c) => c.apply(cx),
        Command::ReplaceComponentMixin(c) => c.apply(cx),
        Command::AddStyleMixin(c) => c.apply(cx),
        Command::RemoveStyleMixin(c) => c.apply(cx),
        Command::UpdateMixinOrder(c) => c.apply(cx),
        Command::RenameStyleMixin(c) => c.apply(cx),
        Command::AddBreakpoint(c) => c.apply(cx),
        Command::RemoveBreakpoint(c) => c.apply(cx),
        Command::UpdateBreakpoint(c) => c.apply(cx),
        Command::AddBehavior(c) => c.apply(cx),
        Command::SetBehavior(c) => c.apply(cx),
        Command::SetBehaviorArg(c) => c.apply(cx),
        Command::SetThemeVariable(c) => c.apply(cx),
        Command::SetThemeFont(c) => c.apply(cx),
        Command::SetGlobalStyle(c) => c.apply(cx),
        Command::SetTranslation(c) => c.apply(cx),
        Command::SetPageHead(c) => c.apply(cx),
        Command::SetDefaultsHead(c) => c.apply(cx),
        Command::SetSiteVersion(c) => c.apply(cx),
        Command::AddPage(c) => c.apply(cx),
        Command::EditPage(c) => c.apply(cx),
        Command::RemovePage(c) => c.apply(cx),
        Command::SetHomePage(c) => c.apply(cx),
        Command::Group(c) => c.apply(cx),
    }
}

pub fn undo(command: &mut Command, cx: &mut CommandContext<'_>) -> EditorResult<()> {
    debug!(command = command.kind(), "undo");
    match command {
        Command::AddComponent(c) => c.undo(cx),
        Command::RemoveComponent(c) => c.undo(cx),
        Command::MoveComponent(c) => c.undo(cx),
        Command::SetComponentTag(c) => c.undo(cx),
        Command::SetComponentContent(c) => c.undo(cx),
        Command::SetComponentInput(c) => c.undo(cx),
        Command::SetComponentState(c) => c.undo(cx),
        Command::SetComponentEvent(c) => c.undo(cx),
        Command::SetComponentEditorEvent(c) => c.undo(cx),
        Command::MarkCustomComponent(c) => c.undo(cx),
        Command::SetCustomStyle(c) => c.undo(cx),
        Command::SetOverrideStyle(c) => c.undo(cx),
        Command::SetMixinEntry(c) => c.undo(cx),
        Command::AddComponentMixin(c) => c.undo(cx),
        Command::RemoveComponentMixin(c) => c.undo(cx),
        Command::ReplaceComponentMixin(c) => c.undo(cx),
        Command::AddStyleMixin(c) => c.undo(cx),
        Command::RemoveStyleMixin(c) => c.undo(cx),
        Command::UpdateMixinOrder(c) => c.undo(cx),
        Command::RenameStyleMixin(c) => c.undo(cx),
        Command::AddBreakpoint(c) => c.undo(cx),
        Command::RemoveBreakpoint(c) => c.undo(cx),
        Command::UpdateBreakpoint(c) => c.undo(cx),
        Command::AddBehavior(c) => c.undo(cx),
        Command::SetBehavior(c) => c.undo(cx),
        Command::SetBehaviorArg(c) => c.undo(cx),
        Command::SetThemeVariable(c) => c.undo(cx),
        Command::SetThemeFont(c) => c.undo(cx),
        Command::SetGlobalStyle(c) => c.undo(cx),
        Command::SetTranslation(c) => c.undo(cx),
        Command::SetPageHead(c) => c.undo(cx),
        Command::SetDefaultsHead(c) => c.undo(cx),
        Command::SetSiteVersion(c) => c.undo(cx),
        Command::AddPage(c) => c.undo(cx),
        Command::EditPage(c) => c.undo(cx),
        Command::RemovePage(c) => c.undo(cx),
        Command::SetHomePage(c) => c.undo(cx),
        Command::Group(c) => c.undo(cx),
    }
}

/// Sub-commands run in order. When one fails, the ones already run are
/// reverted before the error surfaces, so a group lands whole or not at all.
impl CommandOp for Group {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        for at in 0..self.commands.len() {
            if let Err(err) = apply(&mut self.commands[at], cx) {
                warn!(kind = self.commands[at].kind(), "Group apply failed, reverting");
                for command in self.commands[..at].iter_mut().rev() {
                    undo(command, cx)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        for at in (0..self.commands.len()).rev() {
            if let Err(err) = undo(&mut self.commands[at], cx) {
                warn!(kind = self.commands[at].kind(), "Group undo failed, reapplying");
                for command in self.commands[at + 1..].iter_mut() {
                    apply(command, cx)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

//! # Editor
//!
//! Root aggregate: the [`Site`], its [`History`], optional editor side-state,
//! the host hooks and configuration. Every top-level history operation ends
//! with a call to [`EditorHooks::persist`].

use crate::commands::Command;
use crate::config::EditorConfig;
use crate::dispatch::{self, CommandContext};
use crate::editor_state::EditorState;
use crate::errors::EditorResult;
use crate::hooks::{EditorHooks, NoopHooks};
use crate::migration;
use crate::undo_stack::History;
use sitecraft_document::Site;

#[derive(Debug)]
pub struct Editor<H: EditorHooks = NoopHooks> {
    site: Site,
    history: History,
    state: Option<EditorState>,
    hooks: H,
    config: EditorConfig,
}

impl Editor<NoopHooks> {
    /// Editor over a fresh single-page site, without hooks
    pub fn new() -> Self {
        Self::from_config(EditorConfig::default(), NoopHooks)
    }
}

impl Default for Editor<NoopHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EditorHooks> Editor<H> {
    /// Editor over a fresh site in the configured namespace
    pub fn from_config(config: EditorConfig, hooks: H) -> Self {
        let site = Site::new(config.namespace.clone());
        Self::with_site(site, hooks, config)
    }

    pub fn with_site(site: Site, hooks: H, config: EditorConfig) -> Self {
        Self {
            site,
            history: History::with_max_levels(config.history.max_levels),
            state: None,
            hooks,
            config,
        }
    }

    /// Track selection, tree state and lifecycle listeners
    pub fn with_state(mut self) -> Self {
        self.state = Some(EditorState::from_site(&self.site));
        self
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn into_site(self) -> Site {
        self.site
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> Option<&EditorState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut EditorState> {
        self.state.as_mut()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn split(&mut self) -> (&mut History, CommandContext<'_>) {
        let cx = CommandContext::new(&mut self.site, self.state.as_mut(), &mut self.hooks);
        (&mut self.history, cx)
    }

    fn persist(&mut self) {
        self.hooks.persist(&self.site);
    }

    /// Apply `command` and record it as one undo step
    pub fn push(&mut self, command: Command) -> EditorResult<()> {
        let (history, mut cx) = self.split();
        history.push(command, &mut cx)?;
        self.persist();
        Ok(())
    }

    /// Apply `command`, folding it into the latest undo step when possible
    pub fn push_replace(&mut self, command: Command) -> EditorResult<()> {
        let (history, mut cx) = self.split();
        history.push_replace(command, &mut cx)?;
        self.persist();
        Ok(())
    }

    /// Apply `command` as part of the latest undo step
    pub fn push_merge(&mut self, command: Command) -> EditorResult<()> {
        let (history, mut cx) = self.split();
        history.push_merge(command, &mut cx)?;
        self.persist();
        Ok(())
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let (history, mut cx) = self.split();
        let undone = history.undo(&mut cx)?;
        self.persist();
        Ok(undone)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let (history, mut cx) = self.split();
        let redone = history.redo(&mut cx)?;
        self.persist();
        Ok(redone)
    }

    pub fn undo_n(&mut self, n: usize) -> EditorResult<usize> {
        let (history, mut cx) = self.split();
        let undone = history.undo_n(n, &mut cx)?;
        self.persist();
        Ok(undone)
    }

    pub fn redo_n(&mut self, n: usize) -> EditorResult<usize> {
        let (history, mut cx) = self.split();
        let redone = history.redo_n(n, &mut cx)?;
        self.persist();
        Ok(redone)
    }

    /// Apply without recording. Pair with [`Editor::record`] or
    /// [`Editor::revert_detached`].
    pub fn apply_detached(&mut self, command: &mut Command) -> EditorResult<()> {
        let (_, mut cx) = self.split();
        dispatch::apply(command, &mut cx)
    }

    /// Undo a command applied with [`Editor::apply_detached`]
    pub fn revert_detached(&mut self, command: &mut Command) -> EditorResult<()> {
        let (_, mut cx) = self.split();
        dispatch::undo(command, &mut cx)
    }

    /// Record a command whose effect is already in the document
    pub fn record(&mut self, command: Command) {
        self.history.record(command);
        self.persist();
    }

    /// Evict the configured share of the oldest undo steps
    pub fn trim_history(&mut self) -> usize {
        self.history.clear_partial(self.config.history.clear_percent)
    }

    pub fn clear_history(&mut self) {
        self.history.clear_all();
    }

    /// Migrate to the configured target version, returning the version reached
    pub fn migrate(&mut self) -> EditorResult<String> {
        let target = self.config.migration.target_version().to_string();
        migration::apply_migrate_site(self, &target)
    }
}

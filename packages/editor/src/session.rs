//! # Edit Session
//!
//! Coalesces a burst of live edits (a drag, a slider scrub, typing) into one
//! undo step.
//!
//! Each update is applied to the document immediately but kept out of the
//! history as a pending command. `flush` records the pending command as a
//! single entry; `cancel` reverts it.

use crate::commands::Command;
use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::hooks::EditorHooks;
use crate::optimize::{self, Fold};
use tracing::debug;

/// How successive updates combine into the pending command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalesceStrategy {
    /// Fold into one command keeping the earliest "before" and the latest
    /// "after". Updates that cannot fold are merged instead.
    Replace,
    /// Collect every update into one group
    Merge,
}

#[derive(Debug, Default)]
pub struct EditSession {
    strategy: Option<CoalesceStrategy>,
    pending: Option<Command>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a burst. Updates before the next `flush`/`cancel` become one
    /// undo step.
    pub fn begin(&mut self, strategy: CoalesceStrategy) {
        self.strategy = Some(strategy);
    }

    pub fn is_active(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn pending(&self) -> Option<&Command> {
        self.pending.as_ref()
    }

    /// Apply `command` live. Outside a burst this is a plain push.
    pub fn update<H: EditorHooks>(&mut self, editor: &mut Editor<H>, mut command: Command) -> EditorResult<()> {
        let Some(strategy) = self.strategy else {
            return editor.push(command);
        };
        editor.apply_detached(&mut command)?;

        self.pending = match (self.pending.take(), strategy) {
            (None, _) => Some(command),
            (Some(prev), CoalesceStrategy::Merge) => Some(optimize::merge(prev, command)),
            (Some(prev), CoalesceStrategy::Replace) => match optimize::fold(&prev, &command) {
                Fold::Into(folded) => Some(folded),
                Fold::Cancelled => None,
                Fold::Incompatible => Some(optimize::merge(prev, command)),
            },
        };
        Ok(())
    }

    /// End the burst and record the pending command as one undo step.
    /// Returns whether anything was recorded.
    pub fn flush<H: EditorHooks>(&mut self, editor: &mut Editor<H>) -> bool {
        self.strategy = None;
        let Some(command) = self.pending.take().and_then(optimize::optimize_command_group) else {
            return false;
        };
        debug!(command = command.kind(), "Flushing edit session");
        editor.record(command);
        true
    }

    /// End the burst and revert everything applied during it
    pub fn cancel<H: EditorHooks>(&mut self, editor: &mut Editor<H>) -> EditorResult<()> {
        self.strategy = None;
        if let Some(mut command) = self.pending.take() {
            debug!(command = command.kind(), "Cancelling edit session");
            editor.revert_detached(&mut command)?;
        }
        Ok(())
    }
}

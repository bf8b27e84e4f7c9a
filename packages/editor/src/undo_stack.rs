//! # Undo/Redo Stack
//!
//! Back and forward stacks of applied commands.
//!
//! ## Design
//!
//! - `push` applies a command, records it, and invalidates the forward stack
//! - `undo` runs the inverse handler and moves the command forward
//! - `redo` replays the forward handler (hooks that fire once stay quiet)
//! - `push_replace` / `push_merge` coalesce with the latest entry
//! - `clear_partial` evicts the oldest entries to bound memory
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! let mut cx = CommandContext::new(&mut site, None, &mut hooks);
//!
//! history.push(RemoveComponent::new("c-site-4").into(), &mut cx)?;
//! history.undo(&mut cx)?;
//! history.redo(&mut cx)?;
//! ```

use crate::commands::Command;
use crate::dispatch::{self, CommandContext};
use crate::errors::EditorResult;
use crate::optimize::{self, Fold};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Applied commands (most recent last)
    back: Vec<Command>,

    /// Undone commands (most recent last)
    forward: Vec<Command>,

    /// Maximum number of undo levels (0 = unlimited)
    #[serde(default)]
    max_levels: usize,
}

impl History {
    /// Unlimited history
    pub fn new() -> Self {
        Self::with_max_levels(0)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            back: Vec::new(),
            forward: Vec::new(),
            max_levels,
        }
    }

    /// Apply `command` and record it. A command that fails to apply is not
    /// recorded.
    pub fn push(&mut self, command: Command, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        self.push_with(command, cx, true)
    }

    /// Like [`History::push`], optionally leaving the forward stack intact
    pub fn push_with(
        &mut self,
        mut command: Command,
        cx: &mut CommandContext<'_>,
        clear_forward: bool,
    ) -> EditorResult<()> {
        dispatch::apply(&mut command, cx)?;
        self.push_back(command);
        if clear_forward {
            self.forward.clear();
        }
        Ok(())
    }

    /// Record a command whose effect is already in the document
    pub fn record(&mut self, command: Command) {
        self.push_back(command);
        self.forward.clear();
    }

    /// Apply `command` and fold it into the latest entry when both edit the
    /// same target. Otherwise behaves like [`History::push`].
    pub fn push_replace(&mut self, mut command: Command, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        dispatch::apply(&mut command, cx)?;
        self.forward.clear();

        let fold = match self.back.last() {
            Some(prev) => optimize::fold(prev, &command),
            None => Fold::Incompatible,
        };
        match fold {
            Fold::Into(folded) => {
                debug!(command = folded.kind(), "Folded into previous entry");
                if let Some(last) = self.back.last_mut() {
                    *last = folded;
                }
            }
            Fold::Cancelled => {
                debug!(command = command.kind(), "Edit cancelled previous entry");
                self.back.pop();
            }
            Fold::Incompatible => self.push_back(command),
        }
        Ok(())
    }

    /// Apply `command` and append it to the latest entry as one undo step
    pub fn push_merge(&mut self, mut command: Command, cx: &mut CommandContext<'_>) -> EditorResult<()> {
        dispatch::apply(&mut command, cx)?;
        self.forward.clear();

        match self.back.pop() {
            Some(prev) => self.back.push(optimize::merge(prev, command)),
            None => self.push_back(command),
        }
        Ok(())
    }

    fn push_back(&mut self, command: Command) {
        self.back.push(command);

        if self.max_levels > 0 && self.back.len() > self.max_levels {
            self.back.remove(0);
        }
    }

    /// Undo the most recent command. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<bool> {
        let Some(mut command) = self.back.pop() else {
            return Ok(false);
        };
        if let Err(err) = dispatch::undo(&mut command, cx) {
            self.back.push(command);
            return Err(err);
        }
        self.forward.push(command);
        Ok(true)
    }

    /// Redo the most recently undone command
    pub fn redo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<bool> {
        let Some(mut command) = self.forward.pop() else {
            return Ok(false);
        };

        let replay = cx.replay;
        cx.replay = true;
        let result = dispatch::apply(&mut command, cx);
        cx.replay = replay;

        if let Err(err) = result {
            self.forward.push(command);
            return Err(err);
        }
        self.back.push(command);
        Ok(true)
    }

    /// Undo up to `n` commands, returning how many were undone
    pub fn undo_n(&mut self, n: usize, cx: &mut CommandContext<'_>) -> EditorResult<usize> {
        let mut done = 0;
        while done < n && self.undo(cx)? {
            done += 1;
        }
        Ok(done)
    }

    /// Redo up to `n` commands, returning how many were redone
    pub fn redo_n(&mut self, n: usize, cx: &mut CommandContext<'_>) -> EditorResult<usize> {
        let mut done = 0;
        while done < n && self.redo(cx)? {
            done += 1;
        }
        Ok(done)
    }

    /// Drop both stacks. Not undoable.
    pub fn clear_all(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    /// Evict the oldest `floor(len * percent)` back entries. The forward
    /// stack is untouched. Returns the number evicted.
    pub fn clear_partial(&mut self, percent: f64) -> usize {
        let percent = percent.clamp(0.0, 1.0);
        let count = ((self.back.len() as f64) * percent).floor() as usize;
        self.back.drain(..count);
        info!(evicted = count, remaining = self.back.len(), "Trimmed history");
        count
    }

    pub fn can_undo(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.forward.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.back.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.forward.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Description of the command `undo` would revert
    pub fn undo_description(&self) -> Option<String> {
        self.back.last().map(Command::description)
    }

    /// Description of the command `redo` would replay
    pub fn redo_description(&self) -> Option<String> {
        self.forward.last().map(Command::description)
    }

    pub fn back(&self) -> &[Command] {
        &self.back
    }

    pub fn forward(&self) -> &[Command] {
        &self.forward
    }
}

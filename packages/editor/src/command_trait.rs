use crate::dispatch::CommandContext;
use crate::errors::EditorResult;

/// Forward/inverse handler pair owned by each command kind
///
/// Each command payload implements this trait to provide:
/// - `apply`, which mutates the document and records anything undo needs
/// - `undo`, which restores the document from the recorded snapshots only
///
/// Handlers treat unknown ids as silent no-ops; only invariant violations
/// (such as removing the last page) return an error.
pub trait CommandOp {
    fn apply(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()>;

    fn undo(&mut self, cx: &mut CommandContext<'_>) -> EditorResult<()>;
}

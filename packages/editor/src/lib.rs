//! # Sitecraft Editor
//!
//! Reversible command engine over a [`Site`](sitecraft_document::Site).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ caller: builds a Command                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor / EditSession                │
//! │  - History: back + forward stacks           │
//! │  - dispatch: Command → apply / undo         │
//! │  - optimize: fold, merge, flatten groups    │
//! │  - migration: version chain as commands     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: Site mutated in place             │
//! │  + EditorState bookkeeping, EditorHooks     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Commands are self-contained**: each payload carries what it needs to
//!    invert itself, captured during `apply`
//! 2. **Exact inverses**: `apply; undo` leaves the document, the id counter
//!    and editor bookkeeping structurally identical
//! 3. **Migrations are edits**: schema upgrades ride the normal history
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitecraft_editor::{Editor, commands::{AddComponent, ComponentSpec}};
//!
//! let mut editor = Editor::new();
//! let root = editor.site().pages["/"].root.clone();
//!
//! editor.push(AddComponent::new(&root, ComponentSpec::new("h1").with_content("Hi")).into())?;
//! editor.undo()?;
//! editor.redo()?;
//! ```

pub mod change;
pub mod commands;
mod command_trait;
mod config;
mod dispatch;
mod editor;
mod editor_state;
mod errors;
mod hooks;
mod migration;
mod optimize;
mod session;
mod undo_stack;

pub use change::{Change, Direction, Entry};
pub use command_trait::CommandOp;
pub use commands::{Command, Group};
pub use config::{EditorConfig, HistoryConfig, MigrationConfig, DEFAULT_CONFIG_NAME};
pub use dispatch::{apply, undo, CommandContext};
pub use editor::Editor;
pub use editor_state::{Bookkeeping, EditMode, EditorState};
pub use errors::{EditorError, EditorResult};
pub use hooks::{EditorHooks, HookCall, LifecycleEvent, NoopHooks, RecordingHooks};
pub use migration::{
    apply_migrate_site, builtin_behavior, referenced_builtins, rollback_site, BuiltinBehavior,
    BUILTIN_BEHAVIORS, BUILTIN_PREFIX,
};
pub use optimize::{fold, merge, optimize_command_group, Fold};
pub use session::{CoalesceStrategy, EditSession};
pub use undo_stack::History;

// Re-export the document model for convenience
pub use sitecraft_document as document;

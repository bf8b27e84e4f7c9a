//! Error types for the editor
//!
//! Only fatal conditions are errors. Missing ids are silent no-ops and soft
//! failures (malformed head tags, missing migration steps) are logged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Unknown command kind: {0}")]
    UnknownCommand(String),

    #[error("Cannot remove the last remaining page: {0}")]
    LastPage(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Component already selected: {0}")]
    AlreadySelected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type EditorResult<T> = Result<T, EditorError>;

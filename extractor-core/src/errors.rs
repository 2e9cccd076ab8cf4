//! Crate-wide error taxonomy.
//!
//! The variants are deliberately narrow because the worker harness branches
//! on them: `Cancelled` is an expected outcome, `OutOfScopeModule` is
//! recoverable at file granularity, everything else is terminal for the
//! request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The run's cancel flag was observed set. Expected outcome, not a fault.
    #[error("parse run cancelled")]
    Cancelled,

    /// A visitor judged the module outside the project scope (vendored or
    /// third-party code that slipped into the input set). Recoverable: the
    /// dispatcher abandons this one file and continues.
    #[error("module out of scope: {file}")]
    OutOfScopeModule { file: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tree-sitter language error: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("tree-sitter failed to parse {file}")]
    Parse { file: String },

    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

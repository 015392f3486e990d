//! CLI support for simple-lang
//!
//! Provides programmatic access to the `simple` command line functionality
//! for embedding in other tools.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, Mode, execute_check, read_input};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::{EvaluationError, SyntaxError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown category: '{0}'\nRun 'simple docs' to see available categories.")]
    UnknownCategory(String),
}

//! Crate-level error types.

use thiserror::Error;

use crate::parser::ParseError;
use crate::span::{SourceText, Span};

/// Result of loading a schema.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result of a prune request.
pub type PruneResult<T> = Result<T, PruneError>;

/// Errors raised while loading a schema: syntax errors from the parser plus
/// the graph's load-time validation failures.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        span: Span,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("duplicate declaration `{name}`")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("reference to undeclared type `{name}` in `{owner}`")]
    DanglingReference { name: String, owner: String },

    #[error("`{name}` expects {expected} type argument(s) but `{owner}` supplies {found}")]
    ArityMismatch {
        name: String,
        owner: String,
        expected: usize,
        found: usize,
    },
}

impl LoadError {
    pub(crate) fn from_parse(err: ParseError, text: &SourceText) -> Self {
        let (line, column) = text.line_col(err.span.start);
        LoadError::Syntax {
            span: err.span,
            line,
            column,
            message: err.message,
        }
    }
}

/// Errors raised by a prune request against a loaded schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruneError {
    /// The query eliminated the root type itself, so no schema remains.
    #[error("root type `{0}` was eliminated by the query")]
    RootEliminated(String),

    /// The requested root is not declared in the schema.
    #[error("unknown root type `{0}`")]
    UnknownRoot(String),

    /// The schema has no declarations, so there is nothing to prune.
    #[error("cannot prune an empty schema")]
    EmptySchema,
}

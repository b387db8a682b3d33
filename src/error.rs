//! Row-level error types.
//!
//! Table- and invocation-level failures travel as [`anyhow::Error`]; the
//! errors here are the ones a mapper isolates to a single row so the rest of
//! the file keeps flowing.

use thiserror::Error;

/// A single field could not be turned into a SQL literal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    /// Numeric column holds text that does not parse as a number.
    #[error("field '{field}' holds non-numeric value '{value}'")]
    NotNumeric { field: String, value: String },
}

/// Reasons a data row is dropped from a generated script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RowError {
    /// A cell is not valid text in the configured input encoding. `row` holds
    /// a lossy rendering for diagnostics.
    #[error("cannot decode cell using {encoding}")]
    Decode { encoding: &'static str, row: String },

    /// A field failed normalization.
    #[error(transparent)]
    Field(#[from] FieldError),
}

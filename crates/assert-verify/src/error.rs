//! Error types for the validator.
//!
//! Only fatal conditions are errors. Mismatches between expected and actual
//! data are recorded in [`ValidationResult`](crate::ValidationResult) and
//! never abort a run.

use assert_core::ExpectationError;
use thiserror::Error;

/// Errors reported by a data source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The data source could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query against a table failed.
    #[error("Query error on table '{table}': {message}")]
    Query { table: String, message: String },

    /// A column value could not be converted into a tagged value.
    #[error("Conversion error on table '{table}', column '{column}': {message}")]
    Conversion {
        table: String,
        column: String,
        message: String,
    },
}

/// Fatal errors that abort a validation run.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The data source failed.
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// The expectation document is structurally invalid.
    #[error("Invalid expectations: {0}")]
    InvalidExpectation(#[from] ExpectationError),
}

//! Diagnostic formatting.
//!
//! Every outcome is rendered as one stable, greppable line. Value renderings
//! are bounded: long strings are cut at [`MAX_VALUE_CHARS`] characters and
//! arrays longer than [`MAX_ARRAY_ITEMS`] are summarized by their length.

use assert_core::{ExpectedValue, TaggedValue};
use std::fmt;

/// Longest value rendering kept intact.
pub const MAX_VALUE_CHARS: usize = 100;

/// Longest array enumerated element by element.
pub const MAX_ARRAY_ITEMS: usize = 10;

/// Identifies the row a column diagnostic refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowId {
    /// Zero-based position in the fetched rows
    Position(usize),
    /// Composite primary-key string
    Key(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "row {i}"),
            Self::Key(k) => write!(f, "key {k}"),
        }
    }
}

/// Render an expected value for diagnostics.
pub fn format_expected(value: &ExpectedValue) -> String {
    match value {
        ExpectedValue::Sequence(items) if items.len() > MAX_ARRAY_ITEMS => {
            format!("[{} items]", items.len())
        }
        other => truncate(other.to_string()),
    }
}

/// Render an actual value for diagnostics.
pub fn format_actual(value: &TaggedValue) -> String {
    match value {
        TaggedValue::Array(items) if items.len() > MAX_ARRAY_ITEMS => {
            format!("[{} items]", items.len())
        }
        other => truncate(other.to_string()),
    }
}

/// Cut a rendering longer than [`MAX_VALUE_CHARS`] characters.
pub fn truncate(s: String) -> String {
    match s.char_indices().nth(MAX_VALUE_CHARS) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s,
    }
}

pub fn column_matches(table: &str, row: &RowId, column: &str) -> String {
    format!("table {table} [{row}], column {column}: value matches")
}

pub fn column_mismatch(
    table: &str,
    row: &RowId,
    column: &str,
    expected: &ExpectedValue,
    actual: &TaggedValue,
) -> String {
    format!(
        "table {table} [{row}], column {column}: expected {} ({}), got {} ({})",
        format_expected(expected),
        expected.kind_name(),
        format_actual(actual),
        actual.kind()
    )
}

pub fn column_not_found(table: &str, row: &RowId, column: &str) -> String {
    format!("table {table} [{row}], column {column}: column not found")
}

pub fn table_missing(table: &str) -> String {
    format!("table {table} does not exist")
}

pub fn table_exists(table: &str) -> String {
    format!("table {table} exists")
}

pub fn count_mismatch(table: &str, expected: u64, actual: u64) -> String {
    format!("table {table}: expected {expected} rows, got {actual}")
}

pub fn count_matches(table: &str, count: u64) -> String {
    format!("table {table}: row count matches ({count})")
}

/// `number` is one-based.
pub fn row_missing(table: &str, number: usize, found: usize) -> String {
    format!("table {table}: expected row {number} but only {found} found")
}

/// `number` is one-based.
pub fn row_unmatched(table: &str, number: usize) -> String {
    format!("table {table}: expected row {number} has no matching row")
}

pub fn keyed_row_missing(table: &str, key: &str) -> String {
    format!("table {table}: missing row with key {key}")
}

pub fn keyed_row_unexpected(table: &str, key: &str) -> String {
    format!("table {table}: unexpected row with key {key}")
}

/// `side` is "expected" or "actual"; `number` is one-based.
pub fn key_column_missing(table: &str, side: &str, number: usize, column: &str) -> String {
    format!("table {table}: cannot build key for {side} row {number}: primary key column {column} missing")
}

pub fn duplicate_key(table: &str, side: &str, key: &str) -> String {
    format!("table {table}: duplicate {side} row with key {key}")
}

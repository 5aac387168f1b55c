//! Row matching.
//!
//! Reconciles a table's expected rows with its fetched rows, either by
//! position or by declared primary-key columns, and records every outcome in
//! a [`ValidationResult`].
//!
//! Composite keys are the string forms of the key columns joined with
//! [`KEY_SEPARATOR`]. A key value that itself contains the separator can
//! collide with a different key (`"1|A" + "B"` and `"1" + "A|B"` both give
//! `1|A|B`).

use crate::compare::{compare_values, CompareOptions};
use crate::format::{self, RowId};
use crate::report::ValidationResult;
use assert_core::{ActualRow, ExpectedRow};
use std::collections::HashSet;
use tracing::debug;

/// Separator between the column values of a composite key.
pub const KEY_SEPARATOR: &str = "|";

/// Matches expected rows against actual rows for one table.
pub struct RowMatcher<'a> {
    table: &'a str,
    options: &'a CompareOptions,
}

impl<'a> RowMatcher<'a> {
    /// Create a matcher for the named table.
    pub fn new(table: &'a str, options: &'a CompareOptions) -> Self {
        Self { table, options }
    }

    /// Match `expected` against `actual` and record the outcome.
    ///
    /// With a non-empty `primary_key` rows are matched by key; otherwise by
    /// position, or by content when row order is configured as insignificant.
    pub fn match_rows(
        &self,
        expected: &[ExpectedRow],
        actual: &[ActualRow],
        primary_key: &[String],
        result: &mut ValidationResult,
    ) {
        if !primary_key.is_empty() {
            self.match_by_key(expected, actual, primary_key, result);
        } else if self.options.ordered_rows {
            self.match_by_position(expected, actual, result);
        } else {
            self.match_unordered(expected, actual, result);
        }
    }

    /// Expected row `i` against actual row `i`. Extra actual rows are ignored.
    pub fn match_by_position(
        &self,
        expected: &[ExpectedRow],
        actual: &[ActualRow],
        result: &mut ValidationResult,
    ) {
        for (i, expected_row) in expected.iter().enumerate() {
            match actual.get(i) {
                Some(actual_row) => {
                    self.compare_row(&RowId::Position(i), expected_row, actual_row, result);
                }
                None => result.add_error(format::row_missing(self.table, i + 1, actual.len())),
            }
        }
    }

    /// Each expected row takes the first unused actual row that satisfies
    /// all of its columns. Extra actual rows are ignored.
    pub fn match_unordered(
        &self,
        expected: &[ExpectedRow],
        actual: &[ActualRow],
        result: &mut ValidationResult,
    ) {
        let mut used = vec![false; actual.len()];
        for (i, expected_row) in expected.iter().enumerate() {
            let partner = actual
                .iter()
                .enumerate()
                .find(|(j, actual_row)| !used[*j] && self.row_satisfies(expected_row, actual_row));
            match partner {
                Some((j, actual_row)) => {
                    used[j] = true;
                    self.compare_row(&RowId::Position(j), expected_row, actual_row, result);
                }
                None => result.add_error(format::row_unmatched(self.table, i + 1)),
            }
        }
    }

    /// Match rows by composite primary key.
    ///
    /// Missing keys are reported first, then unexpected keys, then the
    /// column comparison of every key present on both sides.
    pub fn match_by_key(
        &self,
        expected: &[ExpectedRow],
        actual: &[ActualRow],
        primary_key: &[String],
        result: &mut ValidationResult,
    ) {
        let expected_keyed = self.index_rows(
            "expected",
            expected.iter().map(|row| expected_key(row, primary_key)),
            result,
        );
        let actual_keyed = self.index_rows(
            "actual",
            actual.iter().map(|row| actual_key(row, primary_key)),
            result,
        );

        let expected_keys: HashSet<&str> = expected_keyed.iter().map(|(k, _)| k.as_str()).collect();
        let actual_index: std::collections::HashMap<&str, usize> = actual_keyed
            .iter()
            .map(|(k, i)| (k.as_str(), *i))
            .collect();

        for (key, _) in &expected_keyed {
            if !actual_index.contains_key(key.as_str()) {
                result.add_error(format::keyed_row_missing(self.table, key));
            }
        }
        for (key, _) in &actual_keyed {
            if !expected_keys.contains(key.as_str()) {
                result.add_error(format::keyed_row_unexpected(self.table, key));
            }
        }
        for (key, expected_idx) in &expected_keyed {
            if let Some(actual_idx) = actual_index.get(key.as_str()) {
                self.compare_row(
                    &RowId::Key(key.clone()),
                    &expected[*expected_idx],
                    &actual[*actual_idx],
                    result,
                );
            }
        }
    }

    /// Compare every expected column of one row pair, recording a message
    /// per matching column and an error per mismatch. Returns whether all
    /// columns matched.
    pub fn compare_row(
        &self,
        row: &RowId,
        expected: &ExpectedRow,
        actual: &ActualRow,
        result: &mut ValidationResult,
    ) -> bool {
        let mut all_match = true;
        for (column, expected_value) in expected.iter() {
            match actual.get(column) {
                Some(actual_value) => {
                    if compare_values(expected_value, actual_value, self.options) {
                        debug!("{}: {} [{}] matches", self.table, column, row);
                        result.add_message(format::column_matches(self.table, row, column));
                    } else {
                        all_match = false;
                        result.add_error(format::column_mismatch(
                            self.table,
                            row,
                            column,
                            expected_value,
                            actual_value,
                        ));
                    }
                }
                None => {
                    all_match = false;
                    result.add_error(format::column_not_found(self.table, row, column));
                }
            }
        }
        all_match
    }

    fn row_satisfies(&self, expected: &ExpectedRow, actual: &ActualRow) -> bool {
        expected.iter().all(|(column, expected_value)| {
            actual
                .get(column)
                .is_some_and(|actual_value| compare_values(expected_value, actual_value, self.options))
        })
    }

    /// Collect `(key, row index)` pairs in row order, reporting rows whose key
    /// cannot be built and repeated keys. The first occurrence of a key wins.
    fn index_rows(
        &self,
        side: &str,
        keys: impl Iterator<Item = Result<String, String>>,
        result: &mut ValidationResult,
    ) -> Vec<(String, usize)> {
        let mut seen = HashSet::new();
        let mut keyed = Vec::new();
        for (i, key) in keys.enumerate() {
            match key {
                Ok(key) => {
                    if seen.insert(key.clone()) {
                        keyed.push((key, i));
                    } else {
                        result.add_error(format::duplicate_key(self.table, side, &key));
                    }
                }
                Err(column) => {
                    result.add_error(format::key_column_missing(self.table, side, i + 1, &column));
                }
            }
        }
        keyed
    }
}

/// Build the composite key of an expected row.
///
/// Returns the name of the first key column the row does not declare.
pub fn expected_key(row: &ExpectedRow, primary_key: &[String]) -> Result<String, String> {
    join_key(primary_key, |column| row.get(column).map(ToString::to_string))
}

/// Build the composite key of an actual row.
///
/// Returns the name of the first key column the row does not contain.
pub fn actual_key(row: &ActualRow, primary_key: &[String]) -> Result<String, String> {
    join_key(primary_key, |column| row.get(column).map(ToString::to_string))
}

fn join_key(
    primary_key: &[String],
    value_of: impl Fn(&str) -> Option<String>,
) -> Result<String, String> {
    let mut parts = Vec::with_capacity(primary_key.len());
    for column in primary_key {
        let value = value_of(column).ok_or_else(|| column.clone())?;
        parts.push(value);
    }
    Ok(parts.join(KEY_SEPARATOR))
}

//! The expectation document.
//!
//! An expectation document declares, per table, the expected row count and
//! optionally the expected column values, either as a single row applied to
//! the first actual row (legacy mode) or as a list of rows matched
//! positionally or by primary key.
//!
//! ## YAML format
//!
//! ```yaml
//! tables:
//!   Users:
//!     count: 3
//!     columns:
//!       UserID: user-001
//!       Status: 1
//!   Orders:
//!     count: 2
//!     primary_key: [UserID, OrderID]
//!     order_by: [OrderID]
//!     rows:
//!       - {UserID: "1", OrderID: "A", Total: 10.5}
//!       - {UserID: "1", OrderID: "B", Total: 3}
//! ```

use crate::expected::ExpectedValue;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for expectation document operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpectationError {
    /// Error reading the expectation file
    #[error("Failed to read expectation file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Structurally invalid expectation for a table
    #[error("Malformed expectation for table '{table}': {reason}")]
    Malformed { table: String, reason: String },
}

// ============================================================================
// Rows
// ============================================================================

/// Expected column values for one row, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedRow {
    columns: Vec<(String, ExpectedValue)>,
}

impl ExpectedRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column expectation, replacing an earlier one with the same name.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ExpectedValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert a column expectation, replacing an earlier one with the same name.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ExpectedValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Get the expectation for a column.
    pub fn get(&self, column: &str) -> Option<&ExpectedValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Iterate over `(column, expected value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpectedValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Column names in document order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// Number of column expectations.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no column expectations.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<ExpectedValue>> FromIterator<(K, V)> for ExpectedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl<'de> Deserialize<'de> for ExpectedRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ExpectedValue::deserialize(deserializer)? {
            ExpectedValue::Mapping(entries) => Ok(entries.into_iter().collect()),
            other => Err(D::Error::custom(format!(
                "expected a mapping of column names to values, got {}",
                other.kind_name()
            ))),
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Expectations for a single table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableExpectation {
    /// Table name (taken from the document key)
    #[serde(skip)]
    pub name: String,

    /// Expected row count
    pub count: u64,

    /// Single expected row applied to the first actual row (legacy mode)
    #[serde(default)]
    pub columns: Option<ExpectedRow>,

    /// Expected rows, matched positionally or by primary key
    #[serde(default)]
    pub rows: Option<Vec<ExpectedRow>>,

    /// Primary-key columns governing row matching
    #[serde(default)]
    pub primary_key: Option<Vec<String>>,

    /// Optional sort order used when fetching rows
    #[serde(default)]
    pub order_by: Vec<String>,
}

impl TableExpectation {
    /// Create an expectation that only checks existence and row count.
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            columns: None,
            rows: None,
            primary_key: None,
            order_by: Vec::new(),
        }
    }

    /// Expect a single row compared against the first actual row.
    pub fn with_columns(mut self, row: ExpectedRow) -> Self {
        self.columns = Some(row);
        self
    }

    /// Expect a list of rows.
    pub fn with_rows(mut self, rows: Vec<ExpectedRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Match rows by the given primary-key columns.
    pub fn with_primary_key<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.primary_key = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Fetch rows sorted by the given columns.
    pub fn with_order_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.order_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this table uses the single-row legacy mode.
    pub fn is_legacy(&self) -> bool {
        self.columns.is_some()
    }

    /// Declared primary-key columns, empty in positional mode.
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key.as_deref().unwrap_or(&[])
    }

    /// Expected rows regardless of mode.
    pub fn expected_rows(&self) -> &[ExpectedRow] {
        match (&self.columns, &self.rows) {
            (Some(row), _) => std::slice::from_ref(row),
            (None, Some(rows)) => rows,
            (None, None) => &[],
        }
    }

    /// Whether any column values are expected.
    pub fn has_column_expectations(&self) -> bool {
        self.expected_rows().iter().any(|row| !row.is_empty())
    }

    /// Columns to fetch: primary-key columns first, then every expected
    /// column in first-seen order, without duplicates.
    pub fn fetch_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let candidates = self
            .primary_key_columns()
            .iter()
            .map(String::as_str)
            .chain(self.expected_rows().iter().flat_map(|row| row.column_names()));
        for name in candidates {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
        columns
    }

    /// Check structural consistency of this expectation.
    pub fn validate(&self) -> Result<(), ExpectationError> {
        let malformed = |reason: &str| ExpectationError::Malformed {
            table: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(malformed("table name is empty"));
        }
        if self.columns.is_some() && self.rows.is_some() {
            return Err(malformed("'columns' and 'rows' are mutually exclusive"));
        }
        if let Some(pk) = &self.primary_key {
            if self.rows.is_none() {
                return Err(malformed("'primary_key' requires 'rows'"));
            }
            if pk.is_empty() {
                return Err(malformed("'primary_key' must name at least one column"));
            }
            if pk.iter().any(|c| c.trim().is_empty()) {
                return Err(malformed("'primary_key' contains an empty column name"));
            }
        }
        if self.order_by.iter().any(|c| c.trim().is_empty()) {
            return Err(malformed("'order_by' contains an empty column name"));
        }
        Ok(())
    }
}

// ============================================================================
// Document
// ============================================================================

/// Parsed expectation document.
///
/// Tables are kept sorted by name so validation output is deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    /// Table expectations keyed by table name
    #[serde(default)]
    tables: BTreeMap<String, TableExpectation>,
}

impl Expectations {
    /// Build a document from table expectations.
    pub fn new(tables: Vec<TableExpectation>) -> Self {
        let mut doc = Self::default();
        for table in tables {
            doc.add_table(table);
        }
        doc
    }

    /// Load expectations from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExpectationError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse expectations from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ExpectationError> {
        let mut doc: Expectations = serde_yaml::from_str(yaml)?;
        for (name, table) in doc.tables.iter_mut() {
            table.name = name.clone();
        }
        Ok(doc)
    }

    /// Add a table expectation, replacing one with the same name.
    pub fn add_table(&mut self, table: TableExpectation) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Get the expectation for a table.
    pub fn get_table(&self, name: &str) -> Option<&TableExpectation> {
        self.tables.get(name)
    }

    /// Iterate over table expectations in table-name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableExpectation> {
        self.tables.values()
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Keep only the named tables. Returns the requested names that were not
    /// declared in the document.
    pub fn retain_tables(&mut self, names: &[String]) -> Vec<String> {
        let unknown = names
            .iter()
            .filter(|n| !self.tables.contains_key(n.as_str()))
            .cloned()
            .collect();
        self.tables.retain(|name, _| names.contains(name));
        unknown
    }

    /// Number of declared tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are declared.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check every table expectation for structural consistency.
    pub fn validate(&self) -> Result<(), ExpectationError> {
        self.tables.values().try_for_each(TableExpectation::validate)
    }
}

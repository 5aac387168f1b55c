//! In-memory data source.
//!
//! Holds tables as vectors of tagged rows. Used by tests and by embedders
//! that already have their data in memory.

use crate::error::SourceError;
use crate::source::DataSource;
use assert_core::{ActualRow, TaggedValue};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A [`DataSource`] backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<ActualRow>>,
    failing: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<ActualRow>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Make every query against `table` fail with a query error.
    pub fn with_failure(mut self, table: impl Into<String>) -> Self {
        self.failing.insert(table.into());
        self
    }

    fn rows(&self, table: &str) -> Result<&[ActualRow], SourceError> {
        if self.failing.contains(table) {
            return Err(SourceError::Query {
                table: table.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| SourceError::Query {
                table: table.to_string(),
                message: "relation does not exist".to_string(),
            })
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn table_exists(&self, table: &str) -> Result<bool, SourceError> {
        if self.failing.contains(table) {
            return Err(SourceError::Connection(format!(
                "cannot inspect table {table}"
            )));
        }
        Ok(self.tables.contains_key(table))
    }

    async fn count_rows(&self, table: &str) -> Result<u64, SourceError> {
        Ok(self.rows(table)?.len() as u64)
    }

    async fn query_rows(
        &self,
        table: &str,
        columns: &[String],
        order_by: &[String],
    ) -> Result<Vec<ActualRow>, SourceError> {
        let mut rows: Vec<&ActualRow> = self.rows(table)?.iter().collect();
        if !order_by.is_empty() {
            rows.sort_by(|a, b| {
                order_by
                    .iter()
                    .map(|column| sort_order(a.get(column), b.get(column)))
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        // Unknown columns are left out rather than failing the query.
        Ok(rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|column| row.get(column).map(|v| (column.clone(), v.clone())))
                    .collect()
            })
            .collect())
    }
}

/// Ascending order with NULLs and absent values last.
fn sort_order(a: Option<&TaggedValue>, b: Option<&TaggedValue>) -> Ordering {
    let a = a.filter(|v| !v.is_absent());
    let b = b.filter(|v| !v.is_absent());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &TaggedValue, b: &TaggedValue) -> Ordering {
    use TaggedValue::*;
    match (a, b) {
        (Int64(x), Int64(y)) => x.cmp(y),
        (Float64(x), Float64(y)) => x.total_cmp(y),
        (Int64(x), Float64(y)) => (*x as f64).total_cmp(y),
        (Float64(x), Int64(y)) => x.total_cmp(&(*y as f64)),
        (Decimal(x), Decimal(y)) => x.cmp(y),
        (String(x), String(y)) => x.cmp(y),
        (Bool(x), Bool(y)) => x.cmp(y),
        (Bytes(x), Bytes(y)) => x.cmp(y),
        (Timestamp(x), Timestamp(y)) => x.cmp(y),
        (Date(x), Date(y)) => x.cmp(y),
        (Unknown(x), Unknown(y)) => x.cmp(y),
        _ => a.kind().name().cmp(b.kind().name()).then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

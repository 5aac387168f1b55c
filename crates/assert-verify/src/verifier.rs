//! Validation orchestrator.
//!
//! Walks the tables of an expectation document in name order and runs, per
//! table: an existence check, a row-count check and, when column expectations
//! are present and rows exist, row matching.

use crate::compare::CompareOptions;
use crate::error::VerifyError;
use crate::format;
use crate::matcher::RowMatcher;
use crate::report::ValidationResult;
use crate::source::DataSource;
use assert_core::{Expectations, TableExpectation};
use tracing::{debug, info, warn};

/// Validates expectation documents against a data source.
pub struct Validator<S: DataSource> {
    source: S,
    options: CompareOptions,
}

impl<S: DataSource> Validator<S> {
    /// Create a validator with default comparison options.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: CompareOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate every table of the document.
    ///
    /// Mismatches are collected in the returned result. Only a structurally
    /// invalid document or a failing data source aborts the run.
    pub async fn validate(
        &self,
        expectations: &Expectations,
    ) -> Result<ValidationResult, VerifyError> {
        expectations.validate()?;

        info!("Validating {} tables", expectations.len());
        let mut result = ValidationResult::new();
        for table in expectations.tables() {
            let table_result = self.validate_table(table).await?;
            result.merge(table_result);
        }

        if result.has_errors() {
            warn!("{}", result.summary());
        } else {
            info!("{}", result.summary());
        }
        Ok(result)
    }

    /// Validate a single table.
    pub async fn validate_table(
        &self,
        table: &TableExpectation,
    ) -> Result<ValidationResult, VerifyError> {
        let name = table.name.as_str();
        let mut result = ValidationResult::new();
        result.record_table();

        debug!("Checking table {name}");
        if !self.source.table_exists(name).await? {
            result.add_error(format::table_missing(name));
            return Ok(result);
        }
        result.add_message(format::table_exists(name));

        let count = self.source.count_rows(name).await?;
        if count != table.count {
            result.add_error(format::count_mismatch(name, table.count, count));
        } else {
            result.add_message(format::count_matches(name, count));
        }

        if table.count > 0 && table.has_column_expectations() {
            let columns = table.fetch_columns();
            let rows = self
                .source
                .query_rows(name, &columns, &table.order_by)
                .await?;
            debug!("Fetched {} rows from {name}", rows.len());

            let matcher = RowMatcher::new(name, &self.options);
            if table.is_legacy() {
                // The single legacy row always applies to the first fetched row
                matcher.match_by_position(table.expected_rows(), &rows, &mut result);
            } else {
                matcher.match_rows(
                    table.expected_rows(),
                    &rows,
                    table.primary_key_columns(),
                    &mut result,
                );
            }
        }

        Ok(result)
    }
}

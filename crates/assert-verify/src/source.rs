//! The data source collaborator.

use crate::error::SourceError;
use assert_core::ActualRow;
use async_trait::async_trait;

/// Read-only access to the database under test.
///
/// Implementations convert every column value into a
/// [`TaggedValue`](assert_core::TaggedValue) before returning it. Calls are
/// awaited one at a time; timeouts and cancellation are the implementation's
/// concern.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Check whether a table exists.
    async fn table_exists(&self, table: &str) -> Result<bool, SourceError>;

    /// Count the rows of a table.
    async fn count_rows(&self, table: &str) -> Result<u64, SourceError>;

    /// Fetch the given columns of every row, sorted by `order_by` when it is
    /// not empty and in the source's natural order otherwise.
    ///
    /// A requested column that does not exist may either fail the query or
    /// be left out of the returned rows.
    async fn query_rows(
        &self,
        table: &str,
        columns: &[String],
        order_by: &[String],
    ) -> Result<Vec<ActualRow>, SourceError>;
}

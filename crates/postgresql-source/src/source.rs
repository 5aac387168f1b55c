//! [`DataSource`] implementation over a PostgreSQL connection.

use crate::convert::{convert_text_as_unknown, convert_value, is_mapped_type};
use assert_core::ActualRow;
use assert_verify::{DataSource, SourceError};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, warn};

/// Reads tables of one PostgreSQL schema.
pub struct PostgresSource {
    client: Client,
    schema: String,
}

impl PostgresSource {
    /// Connect to the database at `connection_string`.
    ///
    /// The connection task runs in the background for the lifetime of the
    /// returned source.
    pub async fn connect(
        connection_string: &str,
        schema: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
        });

        Ok(Self::from_client(client, schema))
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }

    async fn existing_columns(&self, table: &str) -> Result<Vec<SelectColumn>, SourceError> {
        let rows = self
            .client
            .query(
                "SELECT column_name, udt_name FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2",
                &[&self.schema, &table],
            )
            .await
            .map_err(|e| query_error(table, e))?;
        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0).map_err(|e| query_error(table, e))?;
                let udt_name: String = row.try_get(1).map_err(|e| query_error(table, e))?;
                Ok(if is_mapped_type(&udt_name) {
                    SelectColumn::new(name)
                } else {
                    SelectColumn::text(name)
                })
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn table_exists(&self, table: &str) -> Result<bool, SourceError> {
        let row = self
            .client
            .query_opt(
                "SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_name = $2",
                &[&self.schema, &table],
            )
            .await
            .map_err(|e| query_error(table, e))?;
        Ok(row.is_some())
    }

    async fn count_rows(&self, table: &str) -> Result<u64, SourceError> {
        let sql = build_count(&self.schema, table);
        debug!("{sql}");
        let row = self
            .client
            .query_one(sql.as_str(), &[])
            .await
            .map_err(|e| query_error(table, e))?;
        let count: i64 = row.try_get(0).map_err(|e| query_error(table, e))?;
        Ok(count.max(0) as u64)
    }

    async fn query_rows(
        &self,
        table: &str,
        columns: &[String],
        order_by: &[String],
    ) -> Result<Vec<ActualRow>, SourceError> {
        // Unknown columns are left out so they surface as "column not found"
        // instead of failing the whole query.
        let existing = self.existing_columns(table).await?;
        let select: Vec<SelectColumn> = columns
            .iter()
            .filter_map(|c| existing.iter().find(|e| e.name == *c).cloned())
            .collect();
        let sort: Vec<String> = order_by
            .iter()
            .filter(|c| {
                let known = existing.iter().any(|e| e.name == **c);
                if !known {
                    warn!("Ignoring unknown order_by column {c} on table {table}");
                }
                known
            })
            .cloned()
            .collect();

        let sql = build_select(&self.schema, table, &select, &sort);
        debug!("{sql}");
        let rows = self
            .client
            .query(sql.as_str(), &[])
            .await
            .map_err(|e| query_error(table, e))?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut actual = ActualRow::new();
            for (index, column) in row.columns().iter().enumerate() {
                let Some(selected) = select.iter().find(|c| c.name == column.name()) else {
                    continue;
                };
                let converted = if selected.as_text {
                    convert_text_as_unknown(row, index)
                } else {
                    convert_value(row, index)
                };
                let value = converted.map_err(|e| SourceError::Conversion {
                    table: table.to_string(),
                    column: column.name().to_string(),
                    message: e.to_string(),
                })?;
                actual.insert(column.name().to_string(), value);
            }
            result.push(actual);
        }
        Ok(result)
    }
}

fn query_error(table: &str, e: tokio_postgres::Error) -> SourceError {
    SourceError::Query {
        table: table.to_string(),
        message: e.to_string(),
    }
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

pub fn build_count(schema: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualified(schema, table))
}

/// A column of the row query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub name: String,
    /// Selected as `::text` because its type has no dedicated conversion.
    pub as_text: bool,
}

impl SelectColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_text: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_text: true,
        }
    }

    fn projection(&self) -> String {
        let ident = quote_ident(&self.name);
        if self.as_text {
            format!("{ident}::text AS {ident}")
        } else {
            ident
        }
    }
}

/// Build the row query. With no columns a constant is selected so the row
/// count is still observed.
pub fn build_select(
    schema: &str,
    table: &str,
    columns: &[SelectColumn],
    order_by: &[String],
) -> String {
    let projection = if columns.is_empty() {
        "1".to_string()
    } else {
        columns
            .iter()
            .map(SelectColumn::projection)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut sql = format!("SELECT {projection} FROM {}", qualified(schema, table));
    if !order_by.is_empty() {
        let order = order_by
            .iter()
            .map(|c| format!("{} ASC NULLS LAST", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn select(names: &[&str]) -> Vec<SelectColumn> {
        names.iter().map(|n| SelectColumn::new(*n)).collect()
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Users"), "\"Users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_build_count() {
        assert_eq!(
            build_count("public", "Users"),
            "SELECT COUNT(*) FROM \"public\".\"Users\""
        );
    }

    #[test]
    fn test_build_select() {
        assert_eq!(
            build_select("public", "Orders", &select(&["UserID", "Total"]), &[]),
            "SELECT \"UserID\", \"Total\" FROM \"public\".\"Orders\""
        );
        assert_eq!(
            build_select("s", "t", &select(&["a"]), &cols(&["b", "a"])),
            "SELECT \"a\" FROM \"s\".\"t\" ORDER BY \"b\" ASC NULLS LAST, \"a\" ASC NULLS LAST"
        );
    }

    #[test]
    fn test_build_select_casts_unmapped_columns() {
        let columns = vec![SelectColumn::new("id"), SelectColumn::text("Addr")];
        assert_eq!(
            build_select("s", "hosts", &columns, &cols(&["id"])),
            "SELECT \"id\", \"Addr\"::text AS \"Addr\" FROM \"s\".\"hosts\" ORDER BY \"id\" ASC NULLS LAST"
        );
    }

    #[test]
    fn test_build_select_without_columns() {
        assert_eq!(build_select("s", "t", &[], &[]), "SELECT 1 FROM \"s\".\"t\"");
    }
}

//! PostgreSQL data source for db-assert.
//!
//! Connects with `tokio-postgres`, checks table existence through
//! `information_schema`, and converts every fetched column into a
//! [`TaggedValue`](assert_core::TaggedValue).
//!
//! Column type mapping:
//!
//! | PostgreSQL                                  | Tagged value |
//! |---------------------------------------------|--------------|
//! | BOOL                                        | Bool         |
//! | INT2, INT4, INT8, OID                       | Int64        |
//! | FLOAT4, FLOAT8                              | Float64      |
//! | NUMERIC                                     | Decimal      |
//! | TEXT, VARCHAR, BPCHAR, NAME, UUID, TIME     | String       |
//! | BYTEA                                       | Bytes        |
//! | TIMESTAMP, TIMESTAMPTZ                      | Timestamp    |
//! | DATE                                        | Date         |
//! | JSON, JSONB                                 | Json         |
//! | one-dimensional arrays of the above         | Array        |
//! | anything else, selected as `::text`         | Unknown      |

pub mod convert;
pub mod source;

pub use convert::{convert_value, ConversionError};
pub use source::PostgresSource;

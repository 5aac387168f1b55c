//! PostgreSQL value conversion.
//!
//! The single seam between driver values and [`TaggedValue`]. Every nullable
//! wrapper, decimal and JSON quirk of the driver is resolved here.

use assert_core::{TaggedValue, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::Row;

/// Errors converting a PostgreSQL value.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read column: {0}")]
    Read(#[from] tokio_postgres::Error),

    #[error("Column index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("Unsupported PostgreSQL type: {0}")]
    Unsupported(String),
}

/// Column types with a dedicated conversion in [`convert_value`].
///
/// Columns of any other type are selected as `::text` and read with
/// [`convert_text_as_unknown`].
pub const MAPPED_TYPES: &[Type] = &[
    Type::BOOL,
    Type::INT2,
    Type::INT4,
    Type::INT8,
    Type::OID,
    Type::FLOAT4,
    Type::FLOAT8,
    Type::NUMERIC,
    Type::TEXT,
    Type::VARCHAR,
    Type::BPCHAR,
    Type::NAME,
    Type::UUID,
    Type::TIME,
    Type::BYTEA,
    Type::TIMESTAMP,
    Type::TIMESTAMPTZ,
    Type::DATE,
    Type::JSON,
    Type::JSONB,
    Type::BOOL_ARRAY,
    Type::INT2_ARRAY,
    Type::INT4_ARRAY,
    Type::INT8_ARRAY,
    Type::FLOAT4_ARRAY,
    Type::FLOAT8_ARRAY,
    Type::NUMERIC_ARRAY,
    Type::TEXT_ARRAY,
    Type::VARCHAR_ARRAY,
    Type::BPCHAR_ARRAY,
    Type::NAME_ARRAY,
    Type::UUID_ARRAY,
    Type::BYTEA_ARRAY,
    Type::TIMESTAMP_ARRAY,
    Type::TIMESTAMPTZ_ARRAY,
    Type::DATE_ARRAY,
    Type::JSON_ARRAY,
    Type::JSONB_ARRAY,
];

/// Whether a type, named as in `information_schema.columns.udt_name`, has a
/// dedicated conversion.
pub fn is_mapped_type(udt_name: &str) -> bool {
    MAPPED_TYPES.iter().any(|ty| ty.name() == udt_name)
}

/// Convert the value at `index` of `row` into a tagged value.
///
/// NULL becomes [`TaggedValue::Null`] carrying the column's kind. Other
/// types are read as text when the driver allows it and rejected otherwise.
pub fn convert_value(row: &Row, index: usize) -> Result<TaggedValue, ConversionError> {
    let column = row
        .columns()
        .get(index)
        .ok_or(ConversionError::IndexOutOfRange(index))?;
    let pg_type = column.type_();

    match *pg_type {
        Type::BOOL => scalar(row, index, ValueKind::Bool, TaggedValue::Bool),
        Type::INT2 => scalar(row, index, ValueKind::Int64, |i: i16| {
            TaggedValue::Int64(i64::from(i))
        }),
        Type::INT4 => scalar(row, index, ValueKind::Int64, |i: i32| {
            TaggedValue::Int64(i64::from(i))
        }),
        Type::INT8 => scalar(row, index, ValueKind::Int64, TaggedValue::Int64),
        Type::OID => scalar(row, index, ValueKind::Int64, |i: u32| {
            TaggedValue::Int64(i64::from(i))
        }),
        Type::FLOAT4 => scalar(row, index, ValueKind::Float64, |f: f32| {
            TaggedValue::Float64(f64::from(f))
        }),
        Type::FLOAT8 => scalar(row, index, ValueKind::Float64, TaggedValue::Float64),
        Type::NUMERIC => scalar(row, index, ValueKind::Decimal, TaggedValue::Decimal),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            scalar(row, index, ValueKind::String, TaggedValue::String)
        }
        Type::UUID => scalar(row, index, ValueKind::String, |u: uuid::Uuid| {
            TaggedValue::String(u.to_string())
        }),
        Type::TIME => scalar(row, index, ValueKind::String, |t: NaiveTime| {
            TaggedValue::String(t.to_string())
        }),
        Type::BYTEA => scalar(row, index, ValueKind::Bytes, TaggedValue::Bytes),
        Type::TIMESTAMP => scalar(row, index, ValueKind::Timestamp, |ts: NaiveDateTime| {
            TaggedValue::Timestamp(ts.and_utc())
        }),
        Type::TIMESTAMPTZ => scalar(row, index, ValueKind::Timestamp, TaggedValue::Timestamp),
        Type::DATE => scalar(row, index, ValueKind::Date, TaggedValue::Date),
        Type::JSON | Type::JSONB => scalar(row, index, ValueKind::Json, TaggedValue::Json),

        Type::BOOL_ARRAY => array(row, index, ValueKind::Bool, TaggedValue::Bool),
        Type::INT2_ARRAY => array(row, index, ValueKind::Int64, |i: i16| {
            TaggedValue::Int64(i64::from(i))
        }),
        Type::INT4_ARRAY => array(row, index, ValueKind::Int64, |i: i32| {
            TaggedValue::Int64(i64::from(i))
        }),
        Type::INT8_ARRAY => array(row, index, ValueKind::Int64, TaggedValue::Int64),
        Type::FLOAT4_ARRAY => array(row, index, ValueKind::Float64, |f: f32| {
            TaggedValue::Float64(f64::from(f))
        }),
        Type::FLOAT8_ARRAY => array(row, index, ValueKind::Float64, TaggedValue::Float64),
        Type::NUMERIC_ARRAY => array(row, index, ValueKind::Decimal, |d: Decimal| {
            TaggedValue::Decimal(d)
        }),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY => {
            array(row, index, ValueKind::String, TaggedValue::String)
        }
        Type::UUID_ARRAY => array(row, index, ValueKind::String, |u: uuid::Uuid| {
            TaggedValue::String(u.to_string())
        }),
        Type::BYTEA_ARRAY => array(row, index, ValueKind::Bytes, TaggedValue::Bytes),
        Type::TIMESTAMP_ARRAY => array(row, index, ValueKind::Timestamp, |ts: NaiveDateTime| {
            TaggedValue::Timestamp(ts.and_utc())
        }),
        Type::TIMESTAMPTZ_ARRAY => array(row, index, ValueKind::Timestamp, |ts: DateTime<Utc>| {
            TaggedValue::Timestamp(ts)
        }),
        Type::DATE_ARRAY => array(row, index, ValueKind::Date, |d: NaiveDate| {
            TaggedValue::Date(d)
        }),
        Type::JSON_ARRAY | Type::JSONB_ARRAY => array(row, index, ValueKind::Json, TaggedValue::Json),

        _ => {
            // For unknown types, try to get as string
            match row.try_get::<_, Option<String>>(index) {
                Ok(Some(text)) => Ok(TaggedValue::Unknown(text)),
                Ok(None) => Ok(TaggedValue::Null(ValueKind::Unknown)),
                Err(_) => Err(ConversionError::Unsupported(pg_type.name().to_string())),
            }
        }
    }
}

/// Read a column that was cast to text because its type has no dedicated
/// mapping. The value keeps the `unknown` kind.
pub fn convert_text_as_unknown(row: &Row, index: usize) -> Result<TaggedValue, ConversionError> {
    if index >= row.len() {
        return Err(ConversionError::IndexOutOfRange(index));
    }
    scalar(row, index, ValueKind::Unknown, TaggedValue::Unknown)
}

fn scalar<'a, T: FromSql<'a>>(
    row: &'a Row,
    index: usize,
    kind: ValueKind,
    wrap: impl FnOnce(T) -> TaggedValue,
) -> Result<TaggedValue, ConversionError> {
    Ok(match row.try_get::<_, Option<T>>(index)? {
        Some(value) => wrap(value),
        None => TaggedValue::Null(kind),
    })
}

fn array<'a, T: FromSql<'a>>(
    row: &'a Row,
    index: usize,
    element_kind: ValueKind,
    wrap: impl Fn(T) -> TaggedValue,
) -> Result<TaggedValue, ConversionError> {
    Ok(match row.try_get::<_, Option<Vec<Option<T>>>>(index)? {
        Some(items) => TaggedValue::Array(
            items
                .into_iter()
                .map(|item| item.map(&wrap).unwrap_or(TaggedValue::Null(element_kind)))
                .collect(),
        ),
        None => TaggedValue::Null(ValueKind::Array),
    })
}

//! Database-observed values.
//!
//! A [`TaggedValue`] is an immutable snapshot of one column value as returned
//! by a database adapter. Adapters convert their driver's native types into
//! this closed enum at a single seam, so the comparator never inspects driver
//! types directly.

use crate::types::ValueKind;
use base64::Engine;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// A row as fetched from the database, keyed by column name.
pub type ActualRow = HashMap<String, TaggedValue>;

/// Value observed in the database, tagged with its kind.
///
/// SQL NULL is represented by [`TaggedValue::Null`], which remembers the kind
/// of the column it was read from. A `Null` never equals a kind-specific zero
/// value: an empty string column and a NULL string column are different
/// states.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// Absent value (SQL NULL) of a column of the given kind
    Null(ValueKind),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point
    Float64(f64),

    /// Exact decimal
    Decimal(Decimal),

    /// Text
    String(String),

    /// Boolean
    Bool(bool),

    /// Binary data
    Bytes(Vec<u8>),

    /// UTC instant with nanosecond precision
    Timestamp(DateTime<Utc>),

    /// Calendar date
    Date(NaiveDate),

    /// JSON document
    Json(serde_json::Value),

    /// Homogeneous array
    Array(Vec<TaggedValue>),

    /// Composite value; fields keep their declared order
    Struct(Vec<(String, TaggedValue)>),

    /// Value of a type the adapter does not classify, in its textual form
    Unknown(String),
}

impl TaggedValue {
    /// Create an absent value with no column type information.
    pub fn null() -> Self {
        Self::Null(ValueKind::Null)
    }

    /// Kind of this value. Absent values report the kind of their column.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null(kind) => *kind,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float64(_) => ValueKind::Float64,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::String(_) => ValueKind::String,
            Self::Bool(_) => ValueKind::Bool,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Date(_) => ValueKind::Date,
            Self::Json(_) => ValueKind::Json,
            Self::Array(_) => ValueKind::Array,
            Self::Struct(_) => ValueKind::Struct,
            Self::Unknown(_) => ValueKind::Unknown,
        }
    }

    /// Check if this value is absent (SQL NULL).
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null(_))
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(_) => f.write_str("NULL"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Bytes(b) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            Self::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Json(v) => write!(f, "{v}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for TaggedValue {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Decimal> for TaggedValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for TaggedValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<NaiveDate> for TaggedValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<u8>> for TaggedValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<serde_json::Value> for TaggedValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<TaggedValue>> From<Option<T>> for TaggedValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::null(),
        }
    }
}

//! Value kinds understood by the comparison engine.
//!
//! `ValueKind` is the discriminant of [`TaggedValue`](crate::TaggedValue). Every
//! column type a database adapter can observe maps onto exactly one kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a database-observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// SQL NULL with no further type information
    Null,

    /// 64-bit signed integer (all integral column types widen to this)
    Int64,

    /// 64-bit IEEE 754 floating point
    Float64,

    /// Exact decimal (NUMERIC / DECIMAL columns)
    Decimal,

    /// Text of any length
    String,

    /// Boolean
    Bool,

    /// Ordered byte sequence
    Bytes,

    /// UTC instant with nanosecond precision
    Timestamp,

    /// Calendar date
    Date,

    /// JSON document
    Json,

    /// Homogeneous array
    Array,

    /// Composite value with named fields
    Struct,

    /// Opaque value the adapter could not classify
    Unknown,
}

impl ValueKind {
    /// Stable lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::Date => "date",
            Self::Json => "json",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_lowercase() {
        assert_eq!(ValueKind::Int64.name(), "int64");
        assert_eq!(ValueKind::Timestamp.to_string(), "timestamp");
        assert_eq!(ValueKind::Json.name(), "json");
    }

    #[test]
    fn test_kind_serde() {
        let yaml = serde_yaml::to_string(&ValueKind::Float64).unwrap();
        assert_eq!(yaml.trim(), "float64");
        let kind: ValueKind = serde_yaml::from_str("timestamp").unwrap();
        assert_eq!(kind, ValueKind::Timestamp);
    }
}

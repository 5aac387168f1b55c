//! Values as written in the expectation document.
//!
//! Expectations are authored by humans in YAML, so they carry the document's
//! native primitive types rather than database types. The comparator coerces
//! an `ExpectedValue` toward the kind of the observed [`TaggedValue`], never
//! the reverse.
//!
//! [`TaggedValue`]: crate::TaggedValue

use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Expected value in document-native types.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    /// Explicit null: the column must be absent
    Null,

    /// Boolean literal
    Bool(bool),

    /// Integer literal
    Int(i64),

    /// Floating point literal
    Float(f64),

    /// String literal
    String(String),

    /// Raw bytes (YAML `!binary`)
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Sequence of values
    Sequence(Vec<ExpectedValue>),

    /// Mapping in document order
    Mapping(Vec<(String, ExpectedValue)>),
}

impl ExpectedValue {
    /// Check if this value is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the document type, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Convert to a JSON value.
    ///
    /// Bytes become a base64 string and dates an ISO `YYYY-MM-DD` string.
    /// Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Bytes(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(b) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<serde_yaml::Value> for ExpectedValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    // u64 beyond i64::MAX and all non-integral numbers
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(mapping) => Self::Mapping(
                mapping
                    .into_iter()
                    .map(|(k, v)| (mapping_key_to_string(&k), Self::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => {
                if tagged.tag == "binary" {
                    if let Value::String(encoded) = &tagged.value {
                        let compact: String =
                            encoded.chars().filter(|c| !c.is_whitespace()).collect();
                        if let Ok(bytes) =
                            base64::engine::general_purpose::STANDARD.decode(compact)
                        {
                            return Self::Bytes(bytes);
                        }
                    }
                }
                Self::from(tagged.value)
            }
        }
    }
}

/// Render a YAML mapping key as a column name.
fn mapping_key_to_string(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

impl<'de> Deserialize<'de> for ExpectedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_yaml::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for ExpectedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExpectedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ExpectedValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ExpectedValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for ExpectedValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ExpectedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for ExpectedValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<NaiveDate> for ExpectedValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<ExpectedValue>> for ExpectedValue {
    fn from(value: Vec<ExpectedValue>) -> Self {
        Self::Sequence(value)
    }
}

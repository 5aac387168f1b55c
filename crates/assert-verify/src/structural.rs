//! Structural comparison: JSON documents, arrays and composite values.
//!
//! Arrays and structs recurse into [`compare_values`] for their elements, so
//! every scalar rule (widening, tolerance, timestamp parsing) applies at any
//! depth.

use crate::compare::{compare_values, CompareOptions};
use assert_core::{ExpectedValue, TaggedValue};
use serde_json::{Number, Value};

/// Compare an expected value with an actual JSON document.
///
/// Both sides are normalized first: string operands holding valid JSON are
/// parsed (invalid JSON stays an opaque string), and numbers are put in a
/// canonical form so that `30` and `30.0` are equal. Objects compare as
/// unordered mappings whatever `ignore_json_key_order` says, since the
/// underlying mapping has no inherent order.
pub fn compare_json(expected: &ExpectedValue, actual: &Value, _options: &CompareOptions) -> bool {
    let expected = match expected {
        ExpectedValue::String(s) => parse_json_operand(s),
        other => other.to_json(),
    };
    let actual = match actual {
        Value::String(s) => parse_json_operand(s),
        other => other.clone(),
    };
    normalize_json(expected) == normalize_json(actual)
}

/// Compare an expected sequence with an actual array, element by element.
///
/// Lengths must match exactly and elements are never reordered.
pub fn compare_array(
    expected: &[ExpectedValue],
    actual: &[TaggedValue],
    options: &CompareOptions,
) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(e, a)| compare_values(e, a, options))
}

/// Compare an expected mapping with an actual composite value.
///
/// Both must have the same field names; each field compares with the full
/// dispatch.
pub fn compare_struct(
    expected: &[(String, ExpectedValue)],
    actual: &[(String, TaggedValue)],
    options: &CompareOptions,
) -> bool {
    expected.len() == actual.len()
        && actual.iter().all(|(name, a)| {
            expected
                .iter()
                .find(|(k, _)| k == name)
                .is_some_and(|(_, e)| compare_values(e, a, options))
        })
}

/// Parse a string operand as JSON, falling back to a JSON string.
fn parse_json_operand(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

/// Canonicalize every number in a JSON tree.
///
/// Integral finite floats within the `i64` range become integers; everything
/// else keeps its representation.
pub fn normalize_json(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(normalize_number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_json(v)))
                .collect(),
        ),
        other => other,
    }
}

fn normalize_number(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Number::from(f as i64)
        }
        _ => n,
    }
}

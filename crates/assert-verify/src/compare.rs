//! Scalar value comparison.
//!
//! Dispatch is by the kind of the actual (database-observed) value. The
//! expected document value is coerced toward that kind, never the reverse.
//! Composite kinds (JSON, arrays, structs) are handed to
//! [`structural`](crate::structural), which recurses back into
//! [`compare_values`].

use crate::structural::{compare_array, compare_json, compare_struct};
use assert_core::{ExpectedValue, TaggedValue};
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Default absolute tolerance for numeric comparison.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Options for configuring comparison behavior.
///
/// Options are read-only for the duration of a validation run and are
/// always passed explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Absolute tolerance for Int/Float and Decimal comparison.
    pub tolerance: f64,
    /// Granularity both timestamps are truncated to before comparison.
    /// `None` compares at full nanosecond precision.
    pub timestamp_truncate_to: Option<TimeDelta>,
    /// JSON objects are compared as unordered mappings. Setting this to
    /// `false` currently compares the same way.
    pub ignore_json_key_order: bool,
    /// When `false` and no primary key is declared, expected rows are
    /// matched against any actual row instead of by position.
    pub ordered_rows: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            timestamp_truncate_to: None,
            ignore_json_key_order: true,
            ordered_rows: true,
        }
    }
}

impl CompareOptions {
    /// Set the numeric tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Truncate timestamps to the given granularity before comparing.
    pub fn with_timestamp_truncation(mut self, granularity: TimeDelta) -> Self {
        self.timestamp_truncate_to = Some(granularity);
        self
    }

    /// Set JSON key-order sensitivity.
    pub fn with_ignore_json_key_order(mut self, ignore: bool) -> Self {
        self.ignore_json_key_order = ignore;
        self
    }

    /// Set row-order sensitivity for tables without a primary key.
    pub fn with_ordered_rows(mut self, ordered: bool) -> Self {
        self.ordered_rows = ordered;
        self
    }
}

/// Compare an expected document value with a database value.
pub fn compare_values(
    expected: &ExpectedValue,
    actual: &TaggedValue,
    options: &CompareOptions,
) -> bool {
    match actual {
        // Nullness is its own state, never equal to a zero value
        TaggedValue::Null(_) => expected.is_null(),
        _ if expected.is_null() => false,

        TaggedValue::Decimal(a) => compare_decimal(expected, a, options.tolerance),
        TaggedValue::Timestamp(a) => compare_timestamp(expected, a, options),
        TaggedValue::Date(a) => compare_date(expected, a),
        TaggedValue::Bytes(a) => compare_bytes(expected, a),
        TaggedValue::Int64(a) => compare_int(expected, *a, options.tolerance),
        TaggedValue::Float64(a) => compare_float(expected, *a, options.tolerance),
        TaggedValue::String(a) => matches!(expected, ExpectedValue::String(e) if e == a),
        TaggedValue::Bool(a) => matches!(expected, ExpectedValue::Bool(e) if e == a),
        TaggedValue::Json(a) => compare_json(expected, a, options),
        TaggedValue::Array(a) => match expected {
            ExpectedValue::Sequence(e) => compare_array(e, a, options),
            _ => false,
        },
        TaggedValue::Struct(a) => match expected {
            ExpectedValue::Mapping(e) => compare_struct(e, a, options),
            _ => false,
        },
        TaggedValue::Unknown(a) => expected.to_string() == *a,
    }
}

/// Coerce an expected value to an exact decimal.
///
/// Tries, in order: a decimal string, an integer, a float, and finally the
/// decimal parse of the value's string form.
pub fn expected_as_decimal(expected: &ExpectedValue) -> Option<Decimal> {
    match expected {
        ExpectedValue::String(s) => parse_decimal(s),
        ExpectedValue::Int(i) => Some(Decimal::from(*i)),
        ExpectedValue::Float(f) => Decimal::from_f64(*f),
        other => parse_decimal(&other.to_string()),
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn compare_decimal(expected: &ExpectedValue, actual: &Decimal, tolerance: f64) -> bool {
    let Some(e) = expected_as_decimal(expected) else {
        return false;
    };
    if e == *actual {
        return true;
    }
    if tolerance <= 0.0 {
        return false;
    }
    // Tolerances beyond the decimal range saturate
    let tol = Decimal::from_f64(tolerance).unwrap_or(Decimal::MAX);
    match actual.checked_sub(e) {
        Some(diff) => diff.abs() <= tol,
        None => false,
    }
}

fn compare_int(expected: &ExpectedValue, actual: i64, tolerance: f64) -> bool {
    match expected {
        // Both integral: compare without going through floating point
        ExpectedValue::Int(e) => {
            let diff = (actual as i128 - *e as i128).unsigned_abs();
            diff == 0 || (diff as f64) <= tolerance
        }
        ExpectedValue::Float(e) => floats_equal(*e, actual as f64, tolerance),
        _ => false,
    }
}

fn compare_float(expected: &ExpectedValue, actual: f64, tolerance: f64) -> bool {
    match expected {
        ExpectedValue::Int(e) => floats_equal(*e as f64, actual, tolerance),
        ExpectedValue::Float(e) => floats_equal(*e, actual, tolerance),
        _ => false,
    }
}

fn floats_equal(expected: f64, actual: f64, tolerance: f64) -> bool {
    expected == actual || (expected - actual).abs() <= tolerance
}

/// Parse an expected timestamp string.
///
/// Accepted forms, tried in order: RFC 3339 with or without fractional
/// seconds, `YYYY-MM-DDTHH:MM:SS[.f]` and `YYYY-MM-DD HH:MM:SS[.f]` read as
/// UTC, and a bare `YYYY-MM-DD` read as midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Truncate a timestamp to the given granularity, counted from the Unix epoch.
///
/// Works over the whole `DateTime<Utc>` range, including instants outside
/// the `i64` nanosecond window. A zero or negative granularity leaves the
/// timestamp unchanged.
pub fn truncate_timestamp(ts: DateTime<Utc>, granularity: Option<TimeDelta>) -> DateTime<Utc> {
    let Some(g) = granularity.filter(|g| *g > TimeDelta::zero()) else {
        return ts;
    };
    let step = i128::from(g.num_seconds()) * NANOS_PER_SEC + i128::from(g.subsec_nanos());
    let total = i128::from(ts.timestamp()) * NANOS_PER_SEC + i128::from(ts.timestamp_subsec_nanos());
    let truncated = total - total.rem_euclid(step);

    let secs = i64::try_from(truncated.div_euclid(NANOS_PER_SEC));
    let nanos = u32::try_from(truncated.rem_euclid(NANOS_PER_SEC));
    match (secs, nanos) {
        (Ok(secs), Ok(nanos)) => DateTime::from_timestamp(secs, nanos).unwrap_or(ts),
        _ => ts,
    }
}

fn compare_timestamp(
    expected: &ExpectedValue,
    actual: &DateTime<Utc>,
    options: &CompareOptions,
) -> bool {
    let parsed = match expected {
        ExpectedValue::String(s) => parse_timestamp(s),
        ExpectedValue::Date(d) => d.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc()),
        _ => None,
    };
    let Some(e) = parsed else {
        return false;
    };
    let granularity = options.timestamp_truncate_to;
    truncate_timestamp(e, granularity) == truncate_timestamp(*actual, granularity)
}

fn compare_date(expected: &ExpectedValue, actual: &NaiveDate) -> bool {
    match expected {
        ExpectedValue::Date(e) => e == actual,
        ExpectedValue::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| parse_timestamp(s).map(|ts| ts.date_naive()))
            .is_some_and(|e| e == *actual),
        _ => false,
    }
}

fn compare_bytes(expected: &ExpectedValue, actual: &[u8]) -> bool {
    let engine = &base64::engine::general_purpose::STANDARD;
    match expected {
        ExpectedValue::Bytes(e) => e.as_slice() == actual,
        ExpectedValue::String(s) => match engine.decode(s) {
            Ok(decoded) => decoded == actual,
            Err(_) => engine.encode(actual) == *s,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_core::ValueKind;
    use chrono::TimeZone;

    fn opts() -> CompareOptions {
        CompareOptions::default()
    }

    fn dec(s: &str) -> TaggedValue {
        TaggedValue::Decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_null_only_matches_null() {
        let expected = ExpectedValue::Null;
        assert!(compare_values(&expected, &TaggedValue::Null(ValueKind::String), &opts()));
        assert!(compare_values(&expected, &TaggedValue::null(), &opts()));
        assert!(!compare_values(&expected, &TaggedValue::from(""), &opts()));
        assert!(!compare_values(&expected, &TaggedValue::Int64(0), &opts()));
        assert!(!compare_values(&expected, &TaggedValue::Bool(false), &opts()));
    }

    #[test]
    fn test_absent_never_matches_zero_value() {
        let actual = TaggedValue::Null(ValueKind::Int64);
        assert!(!compare_values(&ExpectedValue::Int(0), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from(""), &actual, &opts()));
    }

    #[test]
    fn test_decimal_coercions() {
        let actual = dec("10.50");
        assert!(compare_values(&ExpectedValue::from("10.5"), &actual, &opts()));
        assert!(compare_values(&ExpectedValue::Float(10.5), &actual, &opts()));
        assert!(compare_values(&ExpectedValue::from("1.05e1"), &actual, &opts()));
        assert!(compare_values(&ExpectedValue::Int(10), &dec("10.000"), &opts()));
        assert!(!compare_values(&ExpectedValue::from("abc"), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::Bool(true), &actual, &opts()));
    }

    #[test]
    fn test_decimal_tolerance() {
        let exact = CompareOptions::default().with_tolerance(0.0);
        let loose = CompareOptions::default().with_tolerance(0.01);
        let actual = dec("1.005");
        assert!(!compare_values(&ExpectedValue::from("1.0"), &actual, &exact));
        assert!(compare_values(&ExpectedValue::from("1.0"), &actual, &loose));
        assert!(compare_values(&ExpectedValue::from("1.014"), &actual, &loose));
        assert!(!compare_values(&ExpectedValue::from("1.02"), &actual, &loose));
    }

    #[test]
    fn test_decimal_tolerance_beyond_decimal_range() {
        let huge = CompareOptions::default().with_tolerance(1e30);
        assert!(compare_values(&ExpectedValue::Int(1), &dec("5"), &huge));
        assert!(compare_values(&ExpectedValue::from("-3.5"), &dec("1e20"), &huge));
    }

    #[test]
    fn test_decimal_precision_beyond_float() {
        let actual = dec("0.1000000000000000000000000001");
        assert!(!compare_values(
            &ExpectedValue::from("0.1"),
            &actual,
            &CompareOptions::default().with_tolerance(0.0)
        ));
        assert!(compare_values(
            &ExpectedValue::from("0.1000000000000000000000000001"),
            &actual,
            &opts()
        ));
    }

    #[test]
    fn test_numeric_widening() {
        assert!(compare_values(&ExpectedValue::Int(1), &TaggedValue::Int64(1), &opts()));
        assert!(compare_values(&ExpectedValue::Float(1.0), &TaggedValue::Int64(1), &opts()));
        assert!(compare_values(&ExpectedValue::Int(3), &TaggedValue::Float64(3.0), &opts()));
        assert!(compare_values(
            &ExpectedValue::Float(0.1 + 0.2),
            &TaggedValue::Float64(0.3),
            &opts()
        ));
        assert!(!compare_values(&ExpectedValue::Int(2), &TaggedValue::Int64(1), &opts()));
        assert!(!compare_values(&ExpectedValue::from("1"), &TaggedValue::Int64(1), &opts()));
    }

    #[test]
    fn test_integer_tolerance() {
        let loose = CompareOptions::default().with_tolerance(1.0);
        assert!(compare_values(&ExpectedValue::Int(10), &TaggedValue::Int64(11), &loose));
        assert!(!compare_values(&ExpectedValue::Int(10), &TaggedValue::Int64(12), &loose));
        assert!(compare_values(
            &ExpectedValue::Int(i64::MIN),
            &TaggedValue::Int64(i64::MIN),
            &opts()
        ));
    }

    #[test]
    fn test_string_and_bool_are_strict() {
        assert!(compare_values(&ExpectedValue::from("a"), &TaggedValue::from("a"), &opts()));
        assert!(!compare_values(&ExpectedValue::from("a "), &TaggedValue::from("a"), &opts()));
        assert!(!compare_values(&ExpectedValue::Int(1), &TaggedValue::from("1"), &opts()));
        assert!(compare_values(&ExpectedValue::Bool(true), &TaggedValue::Bool(true), &opts()));
        assert!(!compare_values(&ExpectedValue::from("true"), &TaggedValue::Bool(true), &opts()));
    }

    #[test]
    fn test_timestamp_formats() {
        let actual = TaggedValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        for e in [
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.000000000Z",
            "2024-01-15T12:30:00+02:00",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30:00",
        ] {
            assert!(compare_values(&ExpectedValue::from(e), &actual, &opts()), "{e}");
        }
        assert!(!compare_values(&ExpectedValue::from("2024-01-15"), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from("yesterday"), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::Int(0), &actual, &opts()));
    }

    #[test]
    fn test_timestamp_date_only() {
        let actual = TaggedValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert!(compare_values(&ExpectedValue::from("2024-01-15"), &actual, &opts()));
    }

    #[test]
    fn test_timestamp_nanosecond_precision() {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let actual = TaggedValue::Timestamp(base + TimeDelta::nanoseconds(123_456_789));
        let expected = ExpectedValue::from("2024-01-15T10:30:00.123456789Z");
        assert!(compare_values(&expected, &actual, &opts()));

        let micros = ExpectedValue::from("2024-01-15T10:30:00.123456Z");
        assert!(!compare_values(&micros, &actual, &opts()));
        let truncated = CompareOptions::default()
            .with_timestamp_truncation(TimeDelta::microseconds(1));
        assert!(compare_values(&micros, &actual, &truncated));
    }

    #[test]
    fn test_truncation_is_applied_to_both_sides() {
        let actual = TaggedValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 59).unwrap());
        let expected = ExpectedValue::from("2024-01-15T10:30:01Z");
        let by_minute = CompareOptions::default().with_timestamp_truncation(TimeDelta::minutes(1));
        assert!(compare_values(&expected, &actual, &by_minute));
        assert!(!compare_values(&expected, &actual, &opts()));
    }

    #[test]
    fn test_date() {
        let actual = TaggedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(compare_values(&ExpectedValue::from("2024-03-01"), &actual, &opts()));
        assert!(compare_values(
            &ExpectedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            &actual,
            &opts()
        ));
        assert!(!compare_values(&ExpectedValue::from("2024-03-02"), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from("03/01/2024"), &actual, &opts()));
    }

    #[test]
    fn test_bytes() {
        let actual = TaggedValue::Bytes(b"hello".to_vec());
        assert!(compare_values(&ExpectedValue::Bytes(b"hello".to_vec()), &actual, &opts()));
        assert!(compare_values(&ExpectedValue::from("aGVsbG8="), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from("aGVsbG9v"), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from("hello"), &actual, &opts()));
    }

    #[test]
    fn test_empty_bytes() {
        let actual = TaggedValue::Bytes(Vec::new());
        assert!(compare_values(&ExpectedValue::from(""), &actual, &opts()));
        assert!(!compare_values(&ExpectedValue::from(""), &TaggedValue::Null(ValueKind::Bytes), &opts()));
    }

    #[test]
    fn test_unknown_falls_back_to_string_form() {
        let actual = TaggedValue::Unknown("(1,2)".to_string());
        assert!(compare_values(&ExpectedValue::from("(1,2)"), &actual, &opts()));
        let numeric = TaggedValue::Unknown("42".to_string());
        assert!(compare_values(&ExpectedValue::Int(42), &numeric, &opts()));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2024-13-01").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_truncate_ignores_non_positive_granularity() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(truncate_timestamp(ts, Some(TimeDelta::zero())), ts);
        assert_eq!(truncate_timestamp(ts, None), ts);
    }

    #[test]
    fn test_truncate_far_future() {
        let actual = TaggedValue::Timestamp(
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
                + TimeDelta::milliseconds(500),
        );
        let by_second = CompareOptions::default().with_timestamp_truncation(TimeDelta::seconds(1));
        let expected = ExpectedValue::from("9999-12-31T23:59:59Z");
        assert!(compare_values(&expected, &actual, &by_second));
        assert!(!compare_values(&expected, &actual, &opts()));
    }

    #[test]
    fn test_truncate_before_epoch_rounds_down() {
        let ts = Utc.with_ymd_and_hms(1600, 6, 1, 12, 30, 45).unwrap() + TimeDelta::milliseconds(750);
        assert_eq!(
            truncate_timestamp(ts, Some(TimeDelta::seconds(1))),
            Utc.with_ymd_and_hms(1600, 6, 1, 12, 30, 45).unwrap()
        );
        assert_eq!(
            truncate_timestamp(ts, Some(TimeDelta::minutes(1))),
            Utc.with_ymd_and_hms(1600, 6, 1, 12, 30, 0).unwrap()
        );
    }
}

//! Loading expectation documents from disk.

use assert_core::{ExpectationError, ExpectedValue, Expectations};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_load_fixture() {
    let doc = Expectations::from_file(fixture("expectations.yaml")).unwrap();
    doc.validate().unwrap();
    assert_eq!(
        doc.table_names(),
        vec!["audit_log", "orders", "settings", "users"]
    );

    let users = doc.get_table("users").unwrap();
    assert_eq!(users.count, 3);
    assert_eq!(users.order_by, vec!["id"]);
    let first = &users.expected_rows()[0];
    assert_eq!(first.get("id"), Some(&ExpectedValue::Int(1)));
    assert_eq!(first.get("active"), Some(&ExpectedValue::Bool(true)));
    assert_eq!(first.get("balance"), Some(&ExpectedValue::from("1200.50")));
    assert_eq!(first.get("avatar"), Some(&ExpectedValue::Bytes(b"hello".to_vec())));
    assert_eq!(users.expected_rows()[1].get("avatar"), Some(&ExpectedValue::Null));
    assert_eq!(users.expected_rows()[2].get("balance"), Some(&ExpectedValue::Float(17.25)));

    // YAML 1.2 has no date scalar; dates stay strings until compared.
    assert_eq!(first.get("signed_up"), Some(&ExpectedValue::from("2024-03-01")));
}

#[test]
fn test_keyed_and_structural_values() {
    let doc = Expectations::from_file(fixture("expectations.yaml")).unwrap();
    let orders = doc.get_table("orders").unwrap();
    assert_eq!(orders.primary_key_columns(), ["user_id", "order_no"]);
    assert_eq!(
        orders.fetch_columns(),
        vec!["user_id", "order_no", "tags", "metadata"]
    );

    let row = &orders.expected_rows()[0];
    assert_eq!(
        row.get("tags"),
        Some(&ExpectedValue::Sequence(vec!["new".into(), "priority".into()]))
    );
    assert_eq!(
        row.get("metadata"),
        Some(&ExpectedValue::Mapping(vec![
            ("source".to_string(), ExpectedValue::from("web")),
            ("items".to_string(), ExpectedValue::Int(2)),
        ]))
    );
}

#[test]
fn test_count_only_and_legacy_tables() {
    let doc = Expectations::from_file(fixture("expectations.yaml")).unwrap();

    let audit = doc.get_table("audit_log").unwrap();
    assert!(!audit.has_column_expectations());
    assert!(audit.fetch_columns().is_empty());

    let settings = doc.get_table("settings").unwrap();
    assert!(settings.is_legacy());
    assert_eq!(settings.fetch_columns(), vec!["theme"]);
}

#[test]
fn test_missing_file() {
    let err = Expectations::from_file(fixture("does-not-exist.yaml")).unwrap_err();
    assert!(matches!(err, ExpectationError::IoError(_)));
}

#[test]
fn test_unknown_field_rejected() {
    let err = Expectations::from_yaml("tables:\n  t:\n    count: 1\n    colums: {a: 1}\n")
        .unwrap_err();
    assert!(matches!(err, ExpectationError::YamlError(_)));
}

#[test]
fn test_malformed_table_rejected() {
    let doc = Expectations::from_yaml("tables:\n  t:\n    count: 1\n    primary_key: [id]\n")
        .unwrap();
    let err = doc.validate().unwrap_err();
    assert!(err.to_string().contains("'primary_key' requires 'rows'"));
}

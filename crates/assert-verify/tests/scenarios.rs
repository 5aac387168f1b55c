//! End-to-end validation runs against an in-memory source.

use assert_core::{ActualRow, Expectations, TaggedValue, ValueKind};
use assert_verify::{CompareOptions, MemorySource, Validator};

fn row(pairs: &[(&str, TaggedValue)]) -> ActualRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn user(id: &str, status: i64, email: &str) -> ActualRow {
    row(&[
        ("UserID", TaggedValue::from(id)),
        ("Status", TaggedValue::Int64(status)),
        ("Email", TaggedValue::from(email)),
    ])
}

fn order(user: &str, order: &str, total: &str) -> ActualRow {
    row(&[
        ("UserID", TaggedValue::from(user)),
        ("OrderID", TaggedValue::from(order)),
        ("Total", TaggedValue::Decimal(total.parse().unwrap())),
    ])
}

fn users_source() -> MemorySource {
    MemorySource::new().with_table(
        "Users",
        vec![
            user("user-001", 1, "alice@example.com"),
            user("user-002", 0, "bob@example.com"),
            user("user-003", 1, "carol@example.com"),
        ],
    )
}

#[tokio::test]
async fn test_matching_table_passes() {
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Users:
    count: 3
    rows:
      - UserID: user-001
        Status: 1
"#,
    )
    .unwrap();

    let result = Validator::new(users_source())
        .validate(&expectations)
        .await
        .unwrap();
    assert!(!result.has_errors(), "{:?}", result.errors());
    assert_eq!(result.tables_checked(), 1);
}

#[tokio::test]
async fn test_row_count_mismatch() {
    let source = MemorySource::new().with_table("Users", vec![user("user-001", 1, "a@b.c")]);
    let expectations = Expectations::from_yaml("tables:\n  Users:\n    count: 2\n").unwrap();

    let result = Validator::new(source).validate(&expectations).await.unwrap();
    assert_eq!(result.error_count(), 1);
    assert!(result.errors()[0].contains("expected 2 rows, got 1"));
}

#[tokio::test]
async fn test_column_value_mismatch() {
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Users:
    count: 3
    columns:
      Email: alice@example.comfeawfa
"#,
    )
    .unwrap();

    let result = Validator::new(users_source())
        .validate(&expectations)
        .await
        .unwrap();
    assert_eq!(result.error_count(), 1);
    let error = &result.errors()[0];
    assert!(error.contains("column Email"));
    assert!(error.contains("expected"));
    assert!(error.contains("got"));
}

#[tokio::test]
async fn test_missing_table_has_no_row_checks() {
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Ghosts:
    count: 2
    rows:
      - Name: casper
"#,
    )
    .unwrap();

    let result = Validator::new(users_source())
        .validate(&expectations)
        .await
        .unwrap();
    assert_eq!(result.errors(), ["table Ghosts does not exist"]);
    assert!(result.messages().is_empty());
}

#[tokio::test]
async fn test_unexpected_keyed_row() {
    let source = MemorySource::new().with_table(
        "Orders",
        vec![order("1", "A", "10.50"), order("1", "B", "3.25")],
    );
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Orders:
    count: 2
    primary_key: [UserID, OrderID]
    rows:
      - UserID: "1"
        OrderID: B
        Total: 3.25
"#,
    )
    .unwrap();

    let result = Validator::new(source).validate(&expectations).await.unwrap();
    let unexpected: Vec<_> = result
        .errors()
        .iter()
        .filter(|e| e.contains("unexpected row"))
        .collect();
    assert_eq!(unexpected.len(), 1);
    assert!(unexpected[0].contains("1|A"));
    assert_eq!(result.error_count(), 1);
}

#[tokio::test]
async fn test_positional_missing_rows_only() {
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Users:
    count: 3
    order_by: [UserID]
    rows:
      - UserID: user-001
      - UserID: user-002
      - UserID: user-003
      - UserID: user-004
      - UserID: user-005
"#,
    )
    .unwrap();

    let result = Validator::new(users_source())
        .validate(&expectations)
        .await
        .unwrap();
    assert_eq!(
        result.errors(),
        [
            "table Users: expected row 4 but only 3 found",
            "table Users: expected row 5 but only 3 found",
        ]
    );
}

#[tokio::test]
async fn test_every_table_is_reported() {
    let source = users_source().with_table("Orders", vec![order("1", "A", "1.00")]);
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Users:
    count: 4
  Orders:
    count: 1
    rows:
      - Total: "2.00"
  Missing:
    count: 0
"#,
    )
    .unwrap();

    let result = Validator::new(source).validate(&expectations).await.unwrap();
    assert_eq!(result.tables_checked(), 3);
    assert_eq!(
        result.errors(),
        [
            "table Missing does not exist",
            "table Orders [row 0], column Total: expected 2.00 (string), got 1.00 (decimal)",
            "table Users: expected 4 rows, got 3",
        ]
    );
}

#[tokio::test]
async fn test_null_expectations() {
    let source = MemorySource::new().with_table(
        "Profiles",
        vec![row(&[
            ("Bio", TaggedValue::Null(ValueKind::String)),
            ("Nick", TaggedValue::from("")),
        ])],
    );
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Profiles:
    count: 1
    columns:
      Bio: ~
      Nick: ~
"#,
    )
    .unwrap();

    let result = Validator::new(source).validate(&expectations).await.unwrap();
    assert_eq!(
        result.errors(),
        ["table Profiles [row 0], column Nick: expected NULL (null), got  (string)"]
    );
}

#[tokio::test]
async fn test_unordered_rows_option() {
    let expectations = Expectations::from_yaml(
        r#"
tables:
  Users:
    count: 3
    rows:
      - UserID: user-003
      - UserID: user-001
"#,
    )
    .unwrap();

    let ordered = Validator::new(users_source())
        .validate(&expectations)
        .await
        .unwrap();
    assert_eq!(ordered.error_count(), 2);

    let unordered = Validator::new(users_source())
        .with_options(CompareOptions::default().with_ordered_rows(false))
        .validate(&expectations)
        .await
        .unwrap();
    assert!(!unordered.has_errors(), "{:?}", unordered.errors());
}

//! Core types for the db-assert framework.
//!
//! This crate provides the foundational types shared by the comparison
//! engine and the database adapters:
//!
//! - [`ValueKind`] - The closed set of value kinds the comparator reasons about
//! - [`TaggedValue`] - A database-observed value tagged with its kind
//! - [`ExpectedValue`] - A value as written in the expectation document
//! - [`Expectations`] - The parsed expectation document, loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! assert-core (this crate)
//!    │
//!    ├─── assert-verify       (comparators, row matcher, orchestrator)
//!    └─── postgresql-source   (converts PostgreSQL rows into TaggedValue)
//! ```
//!
//! # Example
//!
//! ```rust
//! use assert_core::{ExpectedValue, TaggedValue, ValueKind};
//!
//! let actual = TaggedValue::String("alice".to_string());
//! assert_eq!(actual.kind(), ValueKind::String);
//!
//! let absent = TaggedValue::Null(ValueKind::String);
//! assert!(absent.is_absent());
//!
//! let expected = ExpectedValue::from("alice");
//! assert_eq!(expected.kind_name(), "string");
//! ```

pub mod expectations;
pub mod expected;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use expectations::{ExpectationError, ExpectedRow, Expectations, TableExpectation};
pub use expected::ExpectedValue;
pub use types::ValueKind;
pub use values::{ActualRow, TaggedValue};

//! Value comparison and row-matching engine for db-assert.
//!
//! This crate decides whether rows fetched from a database satisfy a
//! declarative expectation document, and reports every mismatch it finds.
//!
//! # Example
//!
//! ```ignore
//! use assert_core::Expectations;
//! use assert_verify::{CompareOptions, Validator};
//!
//! let expectations = Expectations::from_file("expectations.yaml")?;
//! let validator = Validator::new(source).with_options(CompareOptions::default());
//!
//! let result = validator.validate(&expectations).await?;
//! for error in result.errors() {
//!     println!("FAIL: {error}");
//! }
//! assert!(!result.has_errors());
//! ```

pub mod args;
pub mod compare;
pub mod error;
pub mod format;
pub mod matcher;
pub mod memory;
pub mod report;
pub mod source;
pub mod structural;
pub mod verifier;

pub use args::{CompareArgs, VerifyArgs};
pub use compare::{compare_values, CompareOptions, DEFAULT_TOLERANCE};
pub use error::{SourceError, VerifyError};
pub use format::RowId;
pub use matcher::{RowMatcher, KEY_SEPARATOR};
pub use memory::MemorySource;
pub use report::ValidationResult;
pub use source::DataSource;
pub use verifier::Validator;

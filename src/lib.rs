//! db-assert library
//!
//! Validates the contents of a database against a declarative YAML
//! expectation document.
//!
//! # Crates
//!
//! - `assert_core` - tagged values and the expectation document model
//! - `assert_verify` - comparison, row matching and the validation orchestrator
//! - `postgresql_source` - PostgreSQL data source
//!
//! # CLI Usage
//!
//! ```bash
//! # Validate a database
//! db-assert verify -e expectations.yaml --connection-string postgresql://...
//!
//! # Only check that the document is well formed
//! db-assert check -e expectations.yaml
//! ```

pub mod config;

use anyhow::Context;
use assert_core::Expectations;
use std::path::Path;

/// Load and structurally validate an expectation document, keeping only
/// `tables` when it is not empty.
pub fn load_expectations(path: &Path, tables: &[String]) -> anyhow::Result<Expectations> {
    let mut expectations = Expectations::from_file(path)
        .with_context(|| format!("Failed to load expectations from {path:?}"))?;

    if !tables.is_empty() {
        let unknown = expectations.retain_tables(tables);
        if !unknown.is_empty() {
            anyhow::bail!(
                "Tables not declared in {path:?}: {}",
                unknown.join(", ")
            );
        }
    }

    expectations
        .validate()
        .with_context(|| format!("Invalid expectations in {path:?}"))?;
    Ok(expectations)
}

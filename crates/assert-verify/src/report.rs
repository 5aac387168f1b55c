//! Validation result types.

/// Accumulated outcome of one validation run.
///
/// Errors and informational messages are appended in the order checks run
/// and are read-only once the run completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<String>,
    messages: Vec<String>,
    tables_checked: usize,
}

impl ValidationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validation mismatch.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Record an informational match.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Count one more table as checked.
    pub fn record_table(&mut self) {
        self.tables_checked += 1;
    }

    /// Append another result after this one.
    ///
    /// Used to fold per-table results into the run result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.messages.extend(other.messages);
        self.tables_checked += other.tables_checked;
    }

    /// Recorded mismatches, in order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Recorded informational matches, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Check if any mismatch was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of recorded mismatches.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of tables checked.
    pub fn tables_checked(&self) -> usize {
        self.tables_checked
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.has_errors() {
            format!(
                "validation FAILED: {} errors across {} tables",
                self.errors.len(),
                self.tables_checked
            )
        } else {
            format!(
                "validation PASSED: {} tables, {} checks",
                self.tables_checked,
                self.messages.len()
            )
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A host-visible message attached to a lifecycle result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

/// Ordered list of diagnostics produced by one lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Error, summary, detail);
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Warning, summary, detail);
    }

    fn push(&mut self, severity: Severity, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic {
            severity,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a lifecycle call: the state to persist (absent on error or after delete) plus every
/// diagnostic raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub state: Option<T>,
    pub diagnostics: Diagnostics,
}

impl<T> Outcome<T> {
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_count_as_errors() {
        let mut diags = Diagnostics::new();
        diags.add_warning("using soft delete", "bucket: b, key: k");
        assert!(!diags.has_error());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.errors().count(), 0);
    }

    #[test]
    fn test_error_is_detected() {
        let mut diags = Diagnostics::new();
        diags.add_warning("using soft delete", "bucket: b, key: k");
        diags.add_error("object store", "failed to delete object");
        assert!(diags.has_error());
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_diagnostics_serialize_as_list() {
        let mut diags = Diagnostics::new();
        diags.add_error("state source", "boom");
        let json = serde_json::to_value(&diags).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"severity": "error", "summary": "state source", "detail": "boom"}])
        );
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}

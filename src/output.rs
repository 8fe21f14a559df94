use serde::Serialize;
use tabled::{Table, Tabled};
use tfsync::{Diagnostic, Outcome};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct DiagnosticRow {
    severity: String,
    summary: String,
    detail: String,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            severity: diagnostic.severity.to_string(),
            summary: diagnostic.summary.clone(),
            detail: diagnostic.detail.clone(),
        }
    }
}

pub fn render<T: Serialize>(
    outcome: &Outcome<T>,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome),
        OutputFormat::Table => {
            let mut out = String::new();
            if outcome.diagnostics.is_empty() {
                out.push_str("no diagnostics\n");
            } else {
                let rows: Vec<DiagnosticRow> =
                    outcome.diagnostics.iter().map(DiagnosticRow::from).collect();
                out.push_str(&Table::new(rows).to_string());
                out.push('\n');
            }
            if let Some(state) = &outcome.state {
                out.push_str(&serde_json::to_string_pretty(state)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

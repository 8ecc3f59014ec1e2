//! Per-source status lines and the machine-readable run summary.

use fund_collector::{SourceOutcome, YearRange};
use serde_json::{json, Value};

/// `ok <source>: <n> rows` or `failed <source>: <error>`.
pub fn status_line(outcome: &SourceOutcome) -> String {
    match &outcome.result {
        Ok(rows) => format!("ok {}: {} rows", outcome.source, rows.len()),
        Err(e) => format!("failed {}: {e}", outcome.source),
    }
}

/// JSON summary of a run.
pub fn summary(outcomes: &[SourceOutcome], range: YearRange, exported: &[(String, String)]) -> Value {
    let sources: Vec<Value> = outcomes
        .iter()
        .map(|o| {
            let file = exported
                .iter()
                .find(|(name, _)| name == o.source.name())
                .map(|(_, path)| path.clone());
            json!({
                "source": o.source.name(),
                "label": o.source.label(),
                "success": o.is_success(),
                "rows": o.row_count(),
                "error": o.result.as_ref().err().map(|e| e.to_string()),
                "file": file,
            })
        })
        .collect();

    json!({
        "year_from": range.from,
        "year_to": range.to,
        "sources": sources,
        "failed": outcomes.iter().filter(|o| !o.is_success()).count(),
    })
}

/// Whether the run should exit non-zero: every selected source failed.
pub fn all_failed(outcomes: &[SourceOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(|o| !o.is_success())
}

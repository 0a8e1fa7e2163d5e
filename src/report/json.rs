//! JSON output for comparison results.
//!
//! Serializes the full ComparisonResult (every entry, counts, timestamps)
//! for scripting and piping. Only the rows selected by the mode are listed
//! under "rows".

use serde::Serialize;

use crate::store::diff::{ComparisonResult, DiffEntry};

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a ComparisonResult,
    rows: Vec<&'a DiffEntry>,
    status_changes: usize,
}

pub fn render(result: &ComparisonResult) -> serde_json::Result<String> {
    let report = JsonReport {
        result,
        rows: result.rows().collect(),
        status_changes: result.counts.status_changes(),
    };
    serde_json::to_string_pretty(&report)
}

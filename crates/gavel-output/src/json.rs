use serde::Serialize;

use gavel_core::position::Position;
use gavel_enforce::Results;

use crate::OutputFormatter;

#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    position: &'a Position,
    messages: &'a [String],
}

/// Machine-readable rendering: a JSON array of `{position, messages}`
/// entries in position order.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_results(&self, results: &Results) -> String {
        let entries: Vec<ReportEntry<'_>> = results
            .iter()
            .map(|(pos, msgs)| ReportEntry {
                position: pos,
                messages: msgs,
            })
            .collect();
        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }
}

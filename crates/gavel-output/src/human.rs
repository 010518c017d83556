use gavel_enforce::Results;

use crate::OutputFormatter;

/// Plain-text rendering: one `position: message` block per report, in
/// position order, separated by blank lines.
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_results(&self, results: &Results) -> String {
        let mut out = String::new();
        for (pos, msgs) in results {
            for msg in msgs {
                out.push_str(&format!("{pos}: {msg}\n\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::position::Position;

    #[test]
    fn test_blocks_in_position_order() {
        let mut results = Results::new();
        results.insert(
            Position::new("b.x", 2, 1),
            vec!["violates contract Later\n>> detail".to_string()],
        );
        results.insert(
            Position::new("a.x", 1, 1),
            vec!["violates contract First\n>> here".to_string()],
        );

        let out = HumanFormatter.format_results(&results);
        assert_eq!(
            out,
            "a.x:1:1: violates contract First\n>> here\n\n\
             b.x:2:1: violates contract Later\n>> detail\n\n"
        );
    }

    #[test]
    fn test_empty_results_render_empty() {
        assert_eq!(HumanFormatter.format_results(&Results::new()), "");
    }
}

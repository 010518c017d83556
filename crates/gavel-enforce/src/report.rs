use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;

use gavel_core::position::Position;

/// One violation reported by a contract against a source position.
#[derive(Debug, Clone)]
pub struct Report {
    pub pos: Position,
    pub contract: String,
    pub info: String,
}

/// Violations aggregated by source position. The `BTreeMap` key ordering is
/// the position ordering, so iteration renders the sorted report stream;
/// messages keep their insertion order within a position.
pub type Results = BTreeMap<Position, Vec<String>>;

/// Drains the report channel into aggregated results. Runs on a single
/// collector thread; producers hold channel senders.
///
/// Workers race to the channel, so arrival order within one position is not
/// stable. The target ordering (position, then contract name) is restored
/// here; one contract's own reports keep their emission order.
pub fn collect(rx: Receiver<Report>) -> Results {
    let mut grouped: BTreeMap<Position, Vec<Report>> = BTreeMap::new();
    for r in rx {
        grouped.entry(r.pos.clone()).or_default().push(r);
    }

    let mut results = Results::new();
    for (pos, mut reports) in grouped {
        reports.sort_by(|a, b| a.contract.cmp(&b.contract));
        results.insert(pos, reports.into_iter().map(format_report).collect());
    }
    results
}

fn format_report(r: Report) -> String {
    let mut msg = format!("violates contract {}", r.contract);
    for chunk in r.info.split('\n') {
        msg.push_str("\n>> ");
        msg.push_str(chunk);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_collect_formats_and_groups() {
        let (tx, rx) = mpsc::channel();
        let pos = Position::new("a.x", 1, 1);
        tx.send(Report {
            pos: pos.clone(),
            contract: "First".to_string(),
            info: "one\ntwo".to_string(),
        })
        .unwrap();
        tx.send(Report {
            pos: pos.clone(),
            contract: "Second".to_string(),
            info: "detail".to_string(),
        })
        .unwrap();
        drop(tx);

        let results = collect(rx);
        let msgs = &results[&pos];
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0], "violates contract First\n>> one\n>> two");
        assert_eq!(msgs[1], "violates contract Second\n>> detail");
    }

    #[test]
    fn test_results_iterate_in_position_order() {
        let (tx, rx) = mpsc::channel();
        for line in [30u32, 10, 20] {
            tx.send(Report {
                pos: Position::new("a.x", line, 1),
                contract: "C".to_string(),
                info: String::new(),
            })
            .unwrap();
        }
        drop(tx);

        let results = collect(rx);
        let lines: Vec<u32> = results.keys().map(|p| p.line).collect();
        assert_eq!(lines, vec![10, 20, 30]);
    }
}

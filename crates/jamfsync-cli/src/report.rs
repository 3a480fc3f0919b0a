//! Console output for reconciliation runs.

use jamfsync_core::reconcile::{Outcome, RecordReport, Tally};

pub fn header_line(count: usize, label: &str) -> String {
    format!("Found {} {}", count, label)
}

/// One progress line: `index/count<TAB>id - name<TAB>site (action)`.
/// `index` is zero-based; the line shows it one-based.
pub fn record_line(index: usize, count: usize, report: &RecordReport) -> String {
    let action = match &report.outcome {
        Outcome::Unchanged => "(correct)".to_string(),
        Outcome::Updated => "(updated)".to_string(),
        Outcome::Failed(reason) => format!("(failed: {})", reason),
    };
    format!(
        "{}/{}\t{} - {}\t{} {}",
        index + 1,
        count,
        report.id,
        report.name,
        report.site.as_deref().unwrap_or("?"),
        action
    )
}

pub fn tally_line(label: &str, tally: &Tally) -> String {
    format!(
        "{}: {} checked, {} correct, {} updated, {} failed",
        label,
        tally.total(),
        tally.unchanged,
        tally.updated,
        tally.failed
    )
}

//! Coverage percentages, per count and per snapshot.

use crate::model::{CoverageCount, FileRecord};

/// Percentage covered by a count; a count with nothing to cover is 100%.
#[must_use]
pub fn value(count: &CoverageCount) -> f64 {
    if count.found == 0 {
        100.0
    } else {
        count.hit as f64 / count.found as f64 * 100.0
    }
}

/// Format a count as `"50%"`, `"33.33%"` or `"N/A"` when absent.
///
/// Two decimals are kept unless the fraction is all zeros.
#[must_use]
pub fn percentage(count: Option<&CoverageCount>) -> String {
    match count {
        None => "N/A".to_string(),
        Some(c) => format!("{}%", trim_zero_fraction(&format!("{:.2}", value(c)))),
    }
}

/// Whether a count is fully covered. Cells below 100% are rendered bold.
#[must_use]
pub fn is_complete(count: &CoverageCount) -> bool {
    value(count) >= 100.0
}

/// Aggregate line coverage of a whole snapshot.
///
/// Records without line data contribute nothing; a snapshot with no
/// instrumented lines is 100%.
#[must_use]
pub fn snapshot_percentage(files: &[FileRecord]) -> f64 {
    let total = files
        .iter()
        .filter_map(|f| f.lines.as_ref())
        .fold(CoverageCount::default(), |acc, l| {
            CoverageCount::new(acc.found + l.count.found, acc.hit + l.count.hit)
        });
    value(&total)
}

fn trim_zero_fraction(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
        _ => s,
    }
}

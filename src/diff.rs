/// Matching of coverage records between a current and a base snapshot, and
/// the aggregate delta between them.
///
/// Records are matched by their line signature (`lines.found`,
/// `lines.hit`), not by path. Two different files with the same counts are
/// indistinguishable here, and a renamed file with unchanged counts is not
/// reported. Rows that appear in the output are the ones whose signature
/// exists on only one side.
use crate::model::{DeltaGlyphs, FileRecord, PackageCoverage};
use crate::percentage::snapshot_percentage;

fn signature(record: &FileRecord) -> (u64, u64) {
    record
        .lines
        .as_ref()
        .map(|l| (l.count.found, l.count.hit))
        .unwrap_or((0, 0))
}

/// Records of `items` whose signature does not occur anywhere in `other`.
pub fn unique_against<'a>(
    items: &'a [FileRecord],
    other: &[FileRecord],
) -> Vec<&'a FileRecord> {
    items
        .iter()
        .filter(|item| {
            let sig = signature(item);
            !other.iter().any(|o| signature(o) == sig)
        })
        .collect()
}

/// The rows to tabulate: base-only records followed by current-only
/// records, or the whole current snapshot when there is no base.
pub fn report_rows<'a>(
    current: &'a [FileRecord],
    base: Option<&'a [FileRecord]>,
) -> Vec<&'a FileRecord> {
    match base {
        None => current.iter().collect(),
        Some(base) => {
            let mut rows = unique_against(base, current);
            rows.extend(unique_against(current, base));
            rows
        }
    }
}

/// Find the base package with the same name, if any.
pub fn match_package<'a>(
    package: &PackageCoverage,
    base: &'a [PackageCoverage],
) -> Option<&'a PackageCoverage> {
    base.iter().find(|b| b.package_name == package.package_name)
}

/// Difference in aggregate line coverage, in percentage points, rounded to
/// two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta(f64);

impl Delta {
    pub fn new(raw: f64) -> Self {
        let rounded = (raw * 100.0).round() / 100.0;
        // Normalize -0.0 so it formats as "0.00".
        Self(if rounded == 0.0 { 0.0 } else { rounded })
    }

    /// Delta between the aggregate percentages of two snapshots.
    pub fn between(current: &[FileRecord], base: &[FileRecord]) -> Self {
        Self::new(snapshot_percentage(current) - snapshot_percentage(base))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn arrow(&self) -> &'static str {
        if self.0 < 0.0 {
            "▾"
        } else if self.0 > 0.0 {
            "▴"
        } else {
            ""
        }
    }

    pub fn sign(&self) -> &'static str {
        if self.0 > 0.0 {
            "+"
        } else {
            ""
        }
    }

    /// Text of the delta cell, e.g. `"✅ ▴ +20.00%"`.
    pub fn render(&self, glyphs: DeltaGlyphs) -> String {
        format!(
            "{} {} {}{:.2}%",
            glyphs.for_delta(self.0 < 0.0),
            self.arrow(),
            self.sign(),
            self.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoverageCount, LineCoverage};

    fn file(path: &str, found: u64, hit: u64) -> FileRecord {
        FileRecord {
            file: path.to_string(),
            lines: Some(LineCoverage {
                count: CoverageCount::new(found, hit),
                details: vec![],
            }),
            ..Default::default()
        }
    }

    fn paths(rows: &[&FileRecord]) -> Vec<String> {
        rows.iter().map(|r| r.file.clone()).collect()
    }

    #[test]
    fn test_report_rows_against_itself_is_empty() {
        let snapshot = vec![file("a.js", 10, 5), file("b.js", 3, 3), file("c.js", 0, 0)];
        assert!(report_rows(&snapshot, Some(&snapshot[..])).is_empty());
    }

    #[test]
    fn test_report_rows_without_base_is_current() {
        let current = vec![file("a.js", 10, 5), file("b.js", 3, 3)];
        assert_eq!(paths(&report_rows(&current, None)), vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_report_rows_base_first() {
        let current = vec![file("a.js", 10, 10), file("b.js", 3, 3)];
        let base = vec![file("a.js", 10, 8), file("b.js", 3, 3)];
        assert_eq!(
            paths(&report_rows(&current, Some(&base[..]))),
            vec!["a.js", "a.js"]
        );
        let rows = report_rows(&current, Some(&base[..]));
        assert_eq!(rows[0].lines.as_ref().unwrap().count.hit, 8);
        assert_eq!(rows[1].lines.as_ref().unwrap().count.hit, 10);
    }

    #[test]
    fn test_signature_conflates_files_with_equal_counts() {
        let current = vec![file("new.js", 4, 2)];
        let base = vec![file("old.js", 4, 2)];
        assert!(report_rows(&current, Some(&base[..])).is_empty());
    }

    #[test]
    fn test_match_package() {
        let base = vec![PackageCoverage {
            package_name: "pkgA".to_string(),
            files: vec![],
        }];
        let a = PackageCoverage {
            package_name: "pkgA".to_string(),
            files: vec![],
        };
        let b = PackageCoverage {
            package_name: "pkgB".to_string(),
            files: vec![],
        };
        assert!(match_package(&a, &base).is_some());
        assert!(match_package(&b, &base).is_none());
    }

    #[test]
    fn test_delta_positive() {
        let delta = Delta::between(&[file("src/a.js", 10, 10)], &[file("src/a.js", 10, 8)]);
        assert_eq!(delta.value(), 20.0);
        assert_eq!(delta.render(DeltaGlyphs::Check), "✅ ▴ +20.00%");
    }

    #[test]
    fn test_delta_negative() {
        let delta = Delta::new(-3.333);
        assert_eq!(delta.render(DeltaGlyphs::Check), "❌ ▾ -3.33%");
        assert_eq!(delta.render(DeltaGlyphs::Circle), "🔴 ▾ -3.33%");
    }

    #[test]
    fn test_delta_rounds_to_zero() {
        let delta = Delta::new(-0.001);
        assert_eq!(delta.arrow(), "");
        assert_eq!(delta.sign(), "");
        assert_eq!(delta.render(DeltaGlyphs::Check), "✅  0.00%");
    }
}

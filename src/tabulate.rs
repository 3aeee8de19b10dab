//! Per-file coverage table, grouped by folder.

use std::collections::BTreeMap;

use crate::html::{a, b, element, escape, table, tbody, td, th, tr};
use crate::model::{CoverageCount, FileRecord, ReportOptions};
use crate::percentage::{is_complete, percentage};

/// Number of columns in the table; folder label rows span all of them.
const COLUMNS: &str = "5";

/// Indent applied to file names inside a folder group.
const INDENT: &str = "&nbsp; &nbsp;";

/// Join path segments the way a POSIX path join would: empty and `.`
/// segments are dropped and `..` removes the previous segment.
#[must_use]
pub fn join_path(parts: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
    }
    segments.join("/")
}

/// Blob path of a file relative to the repository, starting with the short
/// commit. `base_path` is only prepended when the recorded path does not
/// already contain it.
#[must_use]
pub fn blob_path(file: &FileRecord, options: &ReportOptions) -> String {
    let base_path = options
        .base_path
        .trim_start_matches("./")
        .trim_end_matches('/');
    let prefix = if base_path.is_empty() || file.file.contains(base_path) {
        ""
    } else {
        base_path
    };
    join_path(&[
        options.short_commit(),
        prefix,
        options.relative_path(&file.file),
    ])
}

fn blob_href(file: &FileRecord, options: &ReportOptions) -> String {
    format!("/{}/blob/{}", options.repository, blob_path(file, options))
}

fn filename(file: &FileRecord, indent: bool, options: &ReportOptions) -> String {
    let relative = options.relative_path(&file.file);
    let last = escape(relative.rsplit('/').next().unwrap_or(relative));

    if options.condense {
        return last;
    }

    let space = if indent { INDENT } else { "" };
    format!("{space}{}", a(&blob_href(file, options), &last))
}

fn coverage_cell(count: Option<&CoverageCount>) -> String {
    let text = percentage(count);
    match count {
        Some(c) if !is_complete(c) => b(&[&text]),
        _ => text,
    }
}

/// Line numbers of untaken branches and missed lines, ascending and
/// deduplicated.
#[must_use]
pub fn uncovered_lines(file: &FileRecord) -> Vec<u32> {
    let mut all: Vec<u32> = file
        .untaken_branch_lines()
        .chain(file.missed_lines())
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

fn uncovered(file: &FileRecord, options: &ReportOptions) -> String {
    if options.condense {
        return "*".to_string();
    }

    let href = blob_href(file, options);
    uncovered_lines(file)
        .iter()
        .map(|line| a(&format!("{href}#L{line}"), &line.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_row(file: &FileRecord, indent: bool, options: &ReportOptions) -> String {
    tr(&[
        &td(&[&filename(file, indent, options)]),
        &td(&[&coverage_cell(file.branches.as_ref().map(|b| &b.count))]),
        &td(&[&coverage_cell(file.functions.as_ref())]),
        &td(&[&coverage_cell(file.lines.as_ref().map(|l| &l.count))]),
        &td(&[&uncovered(file, options)]),
    ])
}

fn to_folder(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    tr(&[&element("td", &[("colspan", COLUMNS)], &[&b(&[&escape(path)])])])
}

/// Group records by containing folder. Keys iterate in ascending order;
/// records keep their input order within a folder.
pub fn group_by_folder<'a>(
    files: &[&'a FileRecord],
    options: &ReportOptions,
) -> BTreeMap<String, Vec<&'a FileRecord>> {
    let mut folders: BTreeMap<String, Vec<&'a FileRecord>> = BTreeMap::new();
    for &file in files {
        let relative = options.relative_path(&file.file);
        let folder = match relative.rsplit_once('/') {
            Some((folder, _)) => folder.to_string(),
            None => String::new(),
        };
        folders.entry(folder).or_default().push(file);
    }
    folders
}

/// Render the records as an HTML table: a header row, then for each folder
/// a label row followed by one row per file.
#[must_use]
pub fn tabulate(files: &[&FileRecord], options: &ReportOptions) -> String {
    let head = tr(&[
        &th(&["File"]),
        &th(&["Branches"]),
        &th(&["Funcs"]),
        &th(&["Lines"]),
        &th(&["Uncovered Lines"]),
    ]);

    let mut rows = vec![head];
    for (folder, group) in group_by_folder(files, options) {
        rows.push(to_folder(&folder));
        for file in group {
            rows.push(to_row(file, !folder.is_empty(), options));
        }
    }

    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    table(&[&tbody(&rows)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchCoverage, BranchDetail, LineCoverage, LineDetail};

    fn options() -> ReportOptions {
        ReportOptions {
            repository: "owner/repo".to_string(),
            commit: "abcdef0123456789".to_string(),
            workspace: "/ws/".to_string(),
            ..Default::default()
        }
    }

    fn file(path: &str, missed: &[u32]) -> FileRecord {
        let details: Vec<LineDetail> = missed
            .iter()
            .map(|&line| LineDetail { line, hit: 0 })
            .collect();
        FileRecord {
            file: path.to_string(),
            branches: None,
            functions: Some(CoverageCount::new(1, 1)),
            lines: Some(LineCoverage {
                count: CoverageCount::new(details.len() as u64 + 1, 1),
                details,
            }),
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["abc1234", "", "src/a.js"]), "abc1234/src/a.js");
        assert_eq!(
            join_path(&["abc1234", "./packages/", "/lib/../src/a.js"]),
            "abc1234/packages/src/a.js"
        );
    }

    #[test]
    fn test_blob_path_prepends_base_path() {
        let opts = ReportOptions {
            base_path: "packages/web".to_string(),
            ..options()
        };
        assert_eq!(
            blob_path(&file("/ws/src/a.js", &[]), &opts),
            "abcdef0/packages/web/src/a.js"
        );
    }

    #[test]
    fn test_blob_path_skips_base_path_already_present() {
        let opts = ReportOptions {
            base_path: "./packages/web/".to_string(),
            ..options()
        };
        assert_eq!(
            blob_path(&file("/ws/packages/web/src/a.js", &[]), &opts),
            "abcdef0/packages/web/src/a.js"
        );
    }

    #[test]
    fn test_folder_grouping_order() {
        let files = vec![
            file("/ws/b/z.js", &[]),
            file("/ws/a/x.js", &[]),
            file("/ws/a/y.js", &[]),
        ];
        let refs: Vec<&FileRecord> = files.iter().collect();
        let out = tabulate(&refs, &options());

        let positions: Vec<usize> = [
            "<b>a</b>",
            ">x.js</a>",
            ">y.js</a>",
            "<b>b</b>",
            ">z.js</a>",
        ]
        .iter()
        .map(|needle| out.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");
    }

    #[test]
    fn test_root_folder_has_no_label_row() {
        let files = vec![file("/ws/README.js", &[])];
        let refs: Vec<&FileRecord> = files.iter().collect();
        let out = tabulate(&refs, &options());
        assert!(!out.contains("colspan"));
        assert!(out.contains("<td><a href=\"/owner/repo/blob/abcdef0/README.js\">README.js</a></td>"));
    }

    #[test]
    fn test_uncovered_lines_sorted_numerically() {
        let record = file("/ws/src/a.js", &[10, 2, 33]);
        assert_eq!(uncovered_lines(&record), vec![2, 10, 33]);

        let out = uncovered(&record, &options());
        assert_eq!(
            out,
            "<a href=\"/owner/repo/blob/abcdef0/src/a.js#L2\">2</a>, \
             <a href=\"/owner/repo/blob/abcdef0/src/a.js#L10\">10</a>, \
             <a href=\"/owner/repo/blob/abcdef0/src/a.js#L33\">33</a>"
        );
    }

    #[test]
    fn test_uncovered_lines_merges_branches() {
        let mut record = file("/ws/src/a.js", &[7]);
        record.branches = Some(BranchCoverage {
            count: CoverageCount::new(3, 1),
            details: vec![
                BranchDetail { line: 7, taken: 0 },
                BranchDetail { line: 3, taken: 0 },
                BranchDetail { line: 3, taken: 4 },
            ],
        });
        assert_eq!(uncovered_lines(&record), vec![3, 7]);
    }

    #[test]
    fn test_condensed_rows() {
        let opts = ReportOptions {
            condense: true,
            ..options()
        };
        let files = vec![file("/ws/src/a.js", &[1, 2])];
        let refs: Vec<&FileRecord> = files.iter().collect();
        let out = tabulate(&refs, &opts);
        assert!(out.contains("<td>a.js</td>"));
        assert!(out.contains("<td>*</td>"));
        assert!(!out.contains("href"));
    }

    #[test]
    fn test_coverage_cells() {
        let files = vec![file("/ws/src/a.js", &[4])];
        let refs: Vec<&FileRecord> = files.iter().collect();
        let out = tabulate(&refs, &options());
        // branches absent, functions complete, lines 1/2
        assert!(out.contains("<td>N/A</td><td>100%</td><td><b>50%</b></td>"));
    }

    #[test]
    fn test_header_row() {
        let out = tabulate(&[], &options());
        assert_eq!(
            out,
            "<table><tbody><tr><th>File</th><th>Branches</th><th>Funcs</th>\
             <th>Lines</th><th>Uncovered Lines</th></tr></tbody></table>"
        );
    }
}

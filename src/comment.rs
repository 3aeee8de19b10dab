//! Composition of the pull-request comment body.
//!
//! Both layouts share a title and the collapsible per-file table; they differ
//! in how the summary rows are laid out. Rendering is a pure function of its
//! inputs, so identical inputs always produce identical bodies.

use crate::diff::{match_package, report_rows, Delta};
use crate::html::{b, details, escape, small, summary, table, tbody, th, tr};
use crate::model::{CoverageInput, FileRecord, PackageCoverage, ReportOptions};
use crate::percentage::snapshot_percentage;
use crate::tabulate::{join_path, tabulate};

/// Above this many uncovered entries the report is condensed: per-line links
/// are dropped to stay under GitHub's comment size limit.
pub const MAX_LINES: usize = 600;

/// GitHub rejects comment bodies longer than this many characters.
pub const MAX_COMMENT_CHARS: usize = 65536;

const CONDENSED_NOTICE: &str = "*Condensed for GitHub comment max";

/// Hidden marker identifying the bot's comment so reruns update it in place.
#[must_use]
pub fn hidden_header(app_name: Option<&str>) -> String {
    match app_name {
        Some(name) if !name.is_empty() => format!("<!-- {name}-code-coverage-assistant -->"),
        _ => "<!-- monorepo-code-coverage-assistant -->".to_string(),
    }
}

/// Render the comment body for either layout.
#[must_use]
pub fn render(input: &CoverageInput, options: &ReportOptions) -> String {
    match input {
        CoverageInput::Single { current, base } => {
            render_single(current, base.as_deref(), options)
        }
        CoverageInput::Monorepo { current, base } => render_monorepo(current, base, options),
    }
}

/// Total uncovered entries across snapshots.
#[must_use]
pub fn count_uncovered<'a>(snapshots: impl IntoIterator<Item = &'a [FileRecord]>) -> usize {
    snapshots
        .into_iter()
        .flatten()
        .map(FileRecord::uncovered_count)
        .sum()
}

fn should_condense(options: &ReportOptions, uncovered: usize) -> bool {
    options.condense || uncovered > MAX_LINES
}

fn title(options: &ReportOptions) -> String {
    format!(
        "Coverage after merging into {} <p></p>",
        b(&[&escape(&options.base)])
    )
}

fn total_cell(files: &[FileRecord]) -> String {
    th(&[&format!("{:.2}%", snapshot_percentage(files))])
}

/// Delta cell, or nothing when there is no base to compare against.
fn delta_cell(
    current: &[FileRecord],
    base: Option<&[FileRecord]>,
    options: &ReportOptions,
) -> String {
    match base {
        Some(base) => th(&[&Delta::between(current, base).render(options.glyphs)]),
        None => String::new(),
    }
}

fn report_section(
    current: &[FileRecord],
    base: Option<&[FileRecord]>,
    options: &ReportOptions,
) -> String {
    let rows = report_rows(current, base);
    details(&[&summary(&["Coverage Report"]), &tabulate(&rows, options)])
}

/// Comment for a single-repository layout.
#[must_use]
pub fn render_single(
    current: &[FileRecord],
    base: Option<&[FileRecord]>,
    options: &ReportOptions,
) -> String {
    let condense = should_condense(options, count_uncovered([current]));
    let options = ReportOptions {
        condense,
        ..options.clone()
    };

    let total = total_cell(current);
    let delta = delta_cell(current, base, &options);
    let header = match options.app_name.as_deref() {
        Some(app) if !app.is_empty() => {
            tbody(&[&tr(&[&th(&[&escape(app)]), &total, &delta])])
        }
        _ => tbody(&[&tr(&[&total, &delta])]),
    };

    let mut out = title(&options);
    out.push_str(&table(&[&header]));
    out.push_str("\n\n");
    out.push_str(&report_section(current, base, &options));
    if condense {
        out.push_str("<br />");
        out.push_str(&small(&[CONDENSED_NOTICE]));
    }
    out
}

/// Comment for a monorepo: one summary table and report section per
/// current package, in input order. Packages without a same-named base
/// package get no delta cell.
#[must_use]
pub fn render_monorepo(
    current: &[PackageCoverage],
    base: &[PackageCoverage],
    options: &ReportOptions,
) -> String {
    let uncovered = count_uncovered(current.iter().map(|p| p.files.as_slice()));
    let condense = should_condense(options, uncovered);

    let mut out = title(options);
    for package in current {
        let package_base = match_package(package, base).map(|p| p.files.as_slice());
        let package_options = ReportOptions {
            base_path: join_path(&[&options.base_path, &package.package_name]),
            condense,
            ..options.clone()
        };

        let header = tbody(&[&tr(&[
            &th(&[&escape(&package.package_name)]),
            &total_cell(&package.files),
            &delta_cell(&package.files, package_base, &package_options),
        ])]);

        out.push_str(&table(&[&header]));
        out.push_str(" \n\n ");
        out.push_str(&report_section(&package.files, package_base, &package_options));
        out.push_str(" <br/>");
    }
    if condense {
        out.push_str(&small(&[CONDENSED_NOTICE]));
    }
    out
}

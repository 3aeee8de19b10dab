//! In-memory representation of LCOV coverage snapshots and the options that
//! drive report rendering. Everything here is built once per invocation and
//! never mutated afterwards.

/// A found/hit pair, used for branches, functions and lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageCount {
    pub found: u64,
    pub hit: u64,
}

impl CoverageCount {
    pub fn new(found: u64, hit: u64) -> Self {
        Self { found, hit }
    }
}

/// Hit count for a single instrumented line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDetail {
    pub line: u32,
    pub hit: u64,
}

/// Taken count for a single branch arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchDetail {
    pub line: u32,
    pub taken: u64,
}

/// Line totals plus the per-line detail they summarize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCoverage {
    pub count: CoverageCount,
    pub details: Vec<LineDetail>,
}

/// Branch totals plus the per-arm detail they summarize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchCoverage {
    pub count: CoverageCount,
    pub details: Vec<BranchDetail>,
}

/// Coverage for one source file in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecord {
    pub file: String,
    pub branches: Option<BranchCoverage>,
    pub functions: Option<CoverageCount>,
    pub lines: Option<LineCoverage>,
}

impl FileRecord {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    /// Line numbers of branch arms never taken, in record order.
    pub fn untaken_branch_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.branches
            .iter()
            .flat_map(|b| b.details.iter())
            .filter(|d| d.taken == 0)
            .map(|d| d.line)
    }

    /// Line numbers never hit, in record order.
    pub fn missed_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines
            .iter()
            .flat_map(|l| l.details.iter())
            .filter(|d| d.hit == 0)
            .map(|d| d.line)
    }

    /// Number of uncovered entries (untaken branches plus missed lines).
    /// A line with both counts twice.
    #[must_use]
    pub fn uncovered_count(&self) -> usize {
        self.untaken_branch_lines().count() + self.missed_lines().count()
    }
}

/// One complete parse of an LCOV report.
pub type Snapshot = Vec<FileRecord>;

/// A named monorepo package with its own snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoverage {
    pub package_name: String,
    pub files: Snapshot,
}

/// The two report layouts. Chosen once when inputs are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageInput {
    Single {
        current: Snapshot,
        base: Option<Snapshot>,
    },
    Monorepo {
        current: Vec<PackageCoverage>,
        base: Vec<PackageCoverage>,
    },
}

/// Emoji pair used in the delta cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DeltaGlyphs {
    /// ✅ for a non-negative delta, ❌ for a drop.
    #[default]
    Check,
    /// 🟢 for a non-negative delta, 🔴 for a drop.
    Circle,
}

impl DeltaGlyphs {
    pub fn for_delta(self, negative: bool) -> &'static str {
        match (self, negative) {
            (DeltaGlyphs::Check, false) => "✅",
            (DeltaGlyphs::Check, true) => "❌",
            (DeltaGlyphs::Circle, false) => "🟢",
            (DeltaGlyphs::Circle, true) => "🔴",
        }
    }
}

/// Everything the renderer needs to know about the repository and the pull
/// request, plus rendering switches.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// `owner/repo`.
    pub repository: String,
    /// Full head commit SHA; links use the first seven characters.
    pub commit: String,
    /// Absolute prefix stripped from every file path.
    pub workspace: String,
    /// Sub-path prepended to file links; per-package in monorepo mode.
    pub base_path: String,
    pub head: String,
    pub base: String,
    pub app_name: Option<String>,
    /// Force terse rendering regardless of report size.
    pub condense: bool,
    pub glyphs: DeltaGlyphs,
}

impl ReportOptions {
    /// The abbreviated commit used in blob links.
    pub fn short_commit(&self) -> &str {
        match self.commit.char_indices().nth(7) {
            Some((idx, _)) => &self.commit[..idx],
            None => &self.commit,
        }
    }

    /// Strip the workspace prefix from a recorded file path.
    pub fn relative_path<'a>(&self, file: &'a str) -> &'a str {
        if self.workspace.is_empty() {
            return file;
        }
        file.strip_prefix(self.workspace.as_str()).unwrap_or(file)
    }
}

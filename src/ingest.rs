use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::discover::{find_coverage_files, CoverageFile, BASE_FILE_NAME, CURRENT_FILE_NAME};
use crate::error::Result;
use crate::model::{CoverageInput, PackageCoverage, Snapshot};
use crate::parsers::lcov::LcovParser;
use crate::parsers::Parser;

/// Where to read coverage from.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Current-branch LCOV file (single-repository layout).
    pub lcov_file: PathBuf,
    /// Optional base-branch LCOV file (single-repository layout).
    pub lcov_base: Option<PathBuf>,
    /// Monorepo root. When set, `lcov.info` / `lcov-base.info` files are
    /// discovered per package instead of reading `lcov_file`.
    pub monorepo_root: Option<PathBuf>,
}

/// Read and parse a coverage file.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read(path)?;
    LcovParser.parse(&content)
}

/// Load the coverage input for a run.
///
/// Returns `Ok(None)` when there is no current coverage at all; the caller
/// should stop without posting anything. A missing base report only drops
/// the comparison.
pub fn load(sources: &Sources) -> Result<Option<CoverageInput>> {
    match &sources.monorepo_root {
        Some(root) => load_monorepo(root),
        None => load_single(&sources.lcov_file, sources.lcov_base.as_deref()),
    }
}

fn load_single(lcov_file: &Path, lcov_base: Option<&Path>) -> Result<Option<CoverageInput>> {
    let raw = match std::fs::read(lcov_file) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "failed to read {}", lcov_file.display());
            info!("No coverage report found at '{}', exiting...", lcov_file.display());
            return Ok(None);
        }
    };
    let current = LcovParser.parse(&raw)?;
    info!(files = current.len(), "parsed {}", lcov_file.display());

    let base = match lcov_base {
        None => None,
        Some(path) => match std::fs::read(path) {
            Ok(raw) => Some(LcovParser.parse(&raw)?),
            Err(e) => {
                warn!(error = %e, "No coverage report found at '{}', ignoring...", path.display());
                None
            }
        },
    };

    Ok(Some(CoverageInput::Single { current, base }))
}

fn load_monorepo(root: &Path) -> Result<Option<CoverageInput>> {
    let current = load_packages(&find_coverage_files(root, CURRENT_FILE_NAME)?)?;
    if current.is_empty() {
        info!(
            "No {} files found under '{}', exiting...",
            CURRENT_FILE_NAME,
            root.display()
        );
        return Ok(None);
    }

    let base = load_packages(&find_coverage_files(root, BASE_FILE_NAME)?)?;
    info!(
        packages = current.len(),
        base_packages = base.len(),
        "loaded monorepo coverage from {}",
        root.display()
    );

    Ok(Some(CoverageInput::Monorepo { current, base }))
}

fn load_packages(files: &[CoverageFile]) -> Result<Vec<PackageCoverage>> {
    files
        .iter()
        .map(|f| {
            Ok(PackageCoverage {
                package_name: f.package_name.clone(),
                files: read_snapshot(&f.path)?,
            })
        })
        .collect()
}

//! Locating per-package LCOV files under a monorepo root.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// Default file name of a package's current coverage report.
pub const CURRENT_FILE_NAME: &str = "lcov.info";

/// Default file name of a package's base-branch coverage report.
pub const BASE_FILE_NAME: &str = "lcov-base.info";

/// An LCOV file found for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageFile {
    pub package_name: String,
    pub path: PathBuf,
}

/// Recursively find every file named `file_name` under `root`.
///
/// The package name is the first path component below `root`, so
/// `packages/web/coverage/lcov.info` under `packages` belongs to `web`. A
/// file directly inside `root` is named after `root` itself. Results are in
/// file-name order at every level; symlinks are not followed.
pub fn find_coverage_files(root: &Path, file_name: &str) -> Result<Vec<CoverageFile>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != file_name {
            continue;
        }

        let path = entry.path();
        let package_name = package_name(root, path);
        debug!(package = %package_name, path = %path.display(), "found coverage file");
        found.push(CoverageFile {
            package_name,
            path: path.to_path_buf(),
        });
    }

    Ok(found)
}

fn package_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut components = relative.components();
    match (components.next(), components.next()) {
        // At least one directory between root and the file.
        (Some(Component::Normal(first)), Some(_)) => first.to_string_lossy().into_owned(),
        _ => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a fresh temporary directory to lay out coverage files in.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    (dir, root)
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// An LCOV record for `path` where lines `1..=found` exist and the first
/// `hit` of them were executed.
pub fn lcov_record(path: &str, found: u32, hit: u32) -> String {
    let mut out = format!("SF:{path}\n");
    for line in 1..=found {
        out.push_str(&format!("DA:{},{}\n", line, u32::from(line <= hit)));
    }
    out.push_str(&format!("LF:{found}\nLH:{hit}\nend_of_record\n"));
    out
}

pub fn options() -> covdelta::model::ReportOptions {
    covdelta::model::ReportOptions {
        repository: "owner/repo".to_string(),
        commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
        workspace: "/home/runner/work/repo/".to_string(),
        head: "feature".to_string(),
        base: "main".to_string(),
        ..Default::default()
    }
}

//! Command handler functions for the covdelta CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use anyhow::{Context as _, Result};
use tracing::{info, warn};

use crate::comment::{self, MAX_COMMENT_CHARS};
use crate::github;
use crate::ingest::{self, Sources};
use crate::model::ReportOptions;

/// Load coverage and render the comment body. `None` means there was no
/// current coverage to report on.
pub fn build_body(sources: &Sources, options: &ReportOptions) -> Result<Option<String>> {
    let Some(input) = ingest::load(sources).context("Failed to load coverage")? else {
        return Ok(None);
    };

    let body = comment::render(&input, options);
    let chars = body.chars().count();
    if chars > MAX_COMMENT_CHARS {
        warn!(
            chars,
            limit = MAX_COMMENT_CHARS,
            "comment body exceeds GitHub's limit and may be rejected"
        );
    }
    Ok(Some(body))
}

/// Render the comment body without posting it.
pub fn cmd_render(sources: &Sources, options: &ReportOptions) -> Result<String> {
    Ok(build_body(sources, options)?
        .map(|body| body + "\n")
        .unwrap_or_default())
}

/// Render the comment body and upsert it on the pull request.
pub fn cmd_comment(
    sources: &Sources,
    ctx: &github::Context,
    options: &ReportOptions,
) -> Result<String> {
    let Some(body) = build_body(sources, options)? else {
        return Ok(String::new());
    };

    let hidden_header = comment::hidden_header(options.app_name.as_deref());
    info!(
        pr = ctx.pr_number,
        chars = body.chars().count(),
        "posting coverage comment"
    );
    ctx.upsert_comment(&body, &hidden_header)?;
    Ok(format!(
        "Coverage comment posted to {}/pull/{}\n",
        ctx.repo, ctx.pr_number
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ReportOptions {
        ReportOptions {
            repository: "owner/repo".to_string(),
            commit: "0123456789abcdef".to_string(),
            base: "main".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cmd_render_single() {
        let dir = tempfile::tempdir().unwrap();
        let lcov = dir.path().join("lcov.info");
        std::fs::write(&lcov, "SF:src/a.js\nDA:1,1\nDA:2,0\nLF:2\nLH:1\nend_of_record\n").unwrap();

        let sources = Sources {
            lcov_file: lcov,
            ..Default::default()
        };
        let out = cmd_render(&sources, &options()).unwrap();

        assert!(out.starts_with("Coverage after merging into <b>main</b>"));
        assert!(out.contains("<th>50.00%</th>"));
        assert!(out.contains("/owner/repo/blob/0123456/src/a.js#L2"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_cmd_render_missing_current_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sources = Sources {
            lcov_file: dir.path().join("missing.info"),
            ..Default::default()
        };
        assert_eq!(cmd_render(&sources, &options()).unwrap(), "");
    }

    #[test]
    fn test_cmd_render_missing_base_renders_without_delta() {
        let dir = tempfile::tempdir().unwrap();
        let lcov = dir.path().join("lcov.info");
        std::fs::write(&lcov, "SF:src/a.js\nDA:1,1\nend_of_record\n").unwrap();

        let sources = Sources {
            lcov_file: lcov,
            lcov_base: Some(dir.path().join("lcov-base.info")),
            monorepo_root: None,
        };
        let out = cmd_render(&sources, &options()).unwrap();
        assert!(out.contains("<tr><th>100.00%</th></tr>"));
        assert!(!out.contains('▴'));
    }
}

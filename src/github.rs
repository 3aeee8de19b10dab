//! GitHub API helpers for posting the coverage comment on a pull request.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CovdeltaError;
use crate::model::{DeltaGlyphs, ReportOptions};

const API_ROOT: &str = "https://api.github.com";

/// The parts of a `pull_request` event payload the report needs.
#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: Option<PullRequest>,
    pub repository: Repository,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: GitRef,
    pub base: GitRef,
}

#[derive(Debug, Deserialize)]
pub struct GitRef {
    pub sha: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

impl PullRequestEvent {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The pull request, or an error for events that are not about one.
    pub fn pull_request(&self) -> crate::error::Result<&PullRequest> {
        self.pull_request.as_ref().ok_or_else(|| {
            CovdeltaError::MissingContext("event payload has no pull_request".to_string())
        })
    }
}

/// Resolved GitHub Actions context: credentials plus the pull request the
/// comment belongs to.
pub struct Context {
    token: String,
    pub repo: String,
    pub pr_number: u64,
    pub head_sha: String,
    pub head_ref: String,
    pub base_ref: String,
}

impl Context {
    /// Build a context from the Actions environment. `token` overrides
    /// `GITHUB_TOKEN`; the pull request is read from the event payload at
    /// `GITHUB_EVENT_PATH`.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let token = match token.filter(|t| !t.is_empty()) {
            Some(t) => t,
            None => std::env::var("GITHUB_TOKEN")
                .context("a GitHub token is required (--github-token or GITHUB_TOKEN)")?,
        };
        let event_path = std::env::var("GITHUB_EVENT_PATH")
            .context("GITHUB_EVENT_PATH environment variable is required")?;
        let event = PullRequestEvent::from_path(Path::new(&event_path))
            .with_context(|| format!("Failed to read event payload {event_path}"))?;
        Self::from_event(token, &event)
    }

    pub fn from_event(token: String, event: &PullRequestEvent) -> Result<Self> {
        let pr = event.pull_request()?;
        Ok(Self {
            token,
            repo: event.repository.full_name.clone(),
            pr_number: pr.number,
            head_sha: pr.head.sha.clone(),
            head_ref: pr.head.ref_name.clone(),
            base_ref: pr.base.ref_name.clone(),
        })
    }

    /// Report options describing this pull request.
    pub fn report_options(
        &self,
        workspace: &str,
        base_path: &str,
        app_name: Option<String>,
        condense: bool,
        glyphs: DeltaGlyphs,
    ) -> ReportOptions {
        ReportOptions {
            repository: self.repo.clone(),
            commit: self.head_sha.clone(),
            workspace: workspace_prefix(workspace),
            base_path: base_path.to_string(),
            head: self.head_ref.clone(),
            base: self.base_ref.clone(),
            app_name,
            condense,
            glyphs,
        }
    }

    /// Create or update the comment carrying `hidden_header`.
    pub fn upsert_comment(&self, body: &str, hidden_header: &str) -> Result<()> {
        upsert_comment(&self.token, &self.repo, self.pr_number, body, hidden_header)?;
        info!("Comment posted to {}/pull/{}", self.repo, self.pr_number);
        Ok(())
    }
}

/// Normalize a workspace directory into the prefix stripped from paths.
#[must_use]
pub fn workspace_prefix(workspace: &str) -> String {
    if workspace.is_empty() || workspace.ends_with('/') {
        workspace.to_string()
    } else {
        format!("{workspace}/")
    }
}

/// Body actually sent to GitHub: the marker first, so later runs find it.
#[must_use]
pub fn comment_body(body: &str, hidden_header: &str) -> String {
    format!("{hidden_header}\n\n{body}")
}

fn request(method: &str, url: &str, token: &str) -> ureq::Request {
    ureq::request(method, url)
        .set("Authorization", &format!("Bearer {}", token))
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", "covdelta")
        .set("X-GitHub-Api-Version", "2022-11-28")
}

#[derive(Deserialize)]
struct Comment {
    id: u64,
    body: Option<String>,
}

/// Find an existing comment on a PR carrying `hidden_header`.
fn find_existing_comment(
    token: &str,
    repo: &str,
    pr_number: u64,
    hidden_header: &str,
) -> Result<Option<u64>> {
    let mut page = 1u32;
    loop {
        let url = format!(
            "{}/repos/{}/issues/{}/comments?per_page=100&page={}",
            API_ROOT, repo, pr_number, page
        );
        let resp = request("GET", &url, token)
            .call()
            .context("Failed to list PR comments")?;

        let comments: Vec<Comment> = resp.into_json().context("Failed to parse comments JSON")?;
        if comments.is_empty() {
            break;
        }
        if let Some(c) = comments
            .iter()
            .find(|c| c.body.as_deref().is_some_and(|b| b.contains(hidden_header)))
        {
            return Ok(Some(c.id));
        }
        page += 1;
    }
    Ok(None)
}

fn upsert_comment(
    token: &str,
    repo: &str,
    pr_number: u64,
    body: &str,
    hidden_header: &str,
) -> Result<()> {
    let payload = serde_json::json!({ "body": comment_body(body, hidden_header) });

    let (action, resp) = match find_existing_comment(token, repo, pr_number, hidden_header)? {
        Some(comment_id) => {
            debug!(comment_id, "updating existing comment");
            let url = format!("{}/repos/{}/issues/comments/{}", API_ROOT, repo, comment_id);
            ("updating", request("PATCH", &url, token).send_json(payload))
        }
        None => {
            debug!("creating new comment");
            let url = format!("{}/repos/{}/issues/{}/comments", API_ROOT, repo, pr_number);
            ("creating", request("POST", &url, token).send_json(payload))
        }
    };

    match resp {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("GitHub API error {} comment (HTTP {}): {}", action, code, body);
        }
        Err(e) => bail!("Failed {} comment: {}", action, e),
    }
}

//! GitHub REST API collaborator
//!
//! Two calls only: list the files changed in a pull request (filename plus
//! unified-diff patch), and create an issue comment on that pull request.
//! Non-success statuses become `DriftError::HostingApi`, which the
//! orchestrator treats as "no context available" rather than a hard failure.

use crate::config::PullRequestContext;
use crate::error::{DriftError, Result};
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("docguard/", env!("CARGO_PKG_VERSION"));

/// One file entry from the pull-request file listing.
///
/// `patch` is absent for binary or oversized files, where GitHub omits the
/// diff body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    /// Path of the file within the repository.
    pub filename: String,
    /// Unified-diff patch text, when GitHub computed one.
    pub patch: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Minimal GitHub API client.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    /// Create a client against the public GitHub API.
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    /// Create a client against a custom base URL (used by tests and GHES).
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// List the files changed in a pull request.
    pub async fn list_pull_request_files(
        &self,
        pr: &PullRequestContext,
    ) -> Result<Vec<ChangedFile>> {
        let endpoint = format!(
            "/repos/{}/pulls/{}/files?per_page=100",
            pr.repository, pr.number
        );
        let response = self
            .request(reqwest::Method::GET, &endpoint)
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        if !response.status().is_success() {
            return Err(DriftError::HostingApi {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        response
            .json::<Vec<ChangedFile>>()
            .await
            .map_err(|e| transport_error(&endpoint, e))
    }

    /// Post a comment on the pull request's conversation thread.
    pub async fn post_issue_comment(&self, pr: &PullRequestContext, body: &str) -> Result<()> {
        let endpoint = format!("/repos/{}/issues/{}/comments", pr.repository, pr.number);
        let response = self
            .request(reqwest::Method::POST, &endpoint)
            .json(&CommentBody { body })
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        if !response.status().is_success() {
            return Err(DriftError::HostingApi {
                status: response.status().as_u16(),
                endpoint,
            });
        }

        Ok(())
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, endpoint))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
    }
}

/// Map a transport-level failure onto the hosting-API error with status 0,
/// so callers treat an unreachable API the same as a non-success status.
fn transport_error(endpoint: &str, err: reqwest::Error) -> DriftError {
    tracing::debug!("GitHub request to {} failed: {}", endpoint, err);
    DriftError::HostingApi {
        status: err.status().map(|s| s.as_u16()).unwrap_or(0),
        endpoint: endpoint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_file_deserialization() {
        let json = r#"[
            {"filename": "src/auth.py", "patch": "@@ -1 +1 @@\n-old\n+new", "status": "modified"},
            {"filename": "logo.png", "status": "added"}
        ]"#;

        let files: Vec<ChangedFile> = serde_json::from_str(json).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "src/auth.py");
        assert!(files[0].patch.is_some());
        assert!(files[1].patch.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GithubClient::with_base_url("t", "https://ghe.example.com/api/v3/");
        assert_eq!(client.base_url, "https://ghe.example.com/api/v3");
    }
}

//! Process configuration
//!
//! All environment access happens here, exactly once, at startup. The rest
//! of the pipeline receives a `&Config` and performs no ambient lookups, so
//! unit tests can construct configurations directly.

use crate::error::{DriftError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable holding the model API credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the model fallback list.
pub const MODELS_VAR: &str = "DOCGUARD_MODELS";

/// Default model candidates, most-preferred first.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.0-flash-001",
    "gemini-1.5-flash",
    "gemini-flash-latest",
];

/// Pull request this run is analyzing, when triggered from a PR job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    /// Pull request number.
    pub number: u64,
    /// Repository in `owner/name` form.
    pub repository: String,
}

/// Configuration resolved once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the model API.
    pub api_key: String,
    /// Ordered model candidates for sequential fallback.
    pub models: Vec<String>,
    /// Bearer token for the repository-hosting API.
    pub github_token: Option<String>,
    /// Pull request context, absent outside PR-triggered jobs.
    pub pull_request: Option<PullRequestContext>,
    /// CI step-summary file (append-only), when provided by the runner.
    pub step_summary_path: Option<PathBuf>,
    /// CI output-variables file, when provided by the runner.
    pub output_path: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// The model API credential is the only hard requirement; everything
    /// related to pull requests and CI files degrades to `None`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(DriftError::MissingCredential { name: API_KEY_VAR })?;

        let models = match std::env::var(MODELS_VAR) {
            Ok(spec) => parse_models(&spec),
            Err(_) => Vec::new(),
        };
        let models = if models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            models
        };

        let github_token = non_empty_var("GITHUB_TOKEN");
        let repository = non_empty_var("GITHUB_REPOSITORY");

        let pull_request = match (repository, non_empty_var("GITHUB_EVENT_PATH")) {
            (Some(repository), Some(event_path)) => {
                std::fs::read_to_string(&event_path)
                    .ok()
                    .and_then(|payload| pull_request_number(&payload))
                    .map(|number| PullRequestContext { number, repository })
            }
            _ => None,
        };

        Ok(Self {
            api_key,
            models,
            github_token,
            pull_request,
            step_summary_path: non_empty_var("GITHUB_STEP_SUMMARY").map(PathBuf::from),
            output_path: non_empty_var("GITHUB_OUTPUT").map(PathBuf::from),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated model list, dropping empty segments.
pub fn parse_models(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shape of the CI event payload, reduced to the one field we need.
#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<EventPullRequest>,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: u64,
}

/// Extract the pull request number from a webhook event payload.
///
/// Returns `None` for events that are not pull-request shaped (push,
/// schedule, workflow_dispatch), which drops the run into local-file mode.
pub fn pull_request_number(payload: &str) -> Option<u64> {
    serde_json::from_str::<EventPayload>(payload)
        .ok()
        .and_then(|event| event.pull_request)
        .map(|pr| pr.number)
}

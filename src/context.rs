//! Code context resolution
//!
//! Decides what code the model will see: either the unified-diff patches of
//! the source files changed in a pull request, or the full contents of a
//! single local file. The label travels with the text so the prompt can be
//! worded for the right shape of input.

use crate::config::PullRequestContext;
use crate::error::{DriftError, Result};
use crate::github::{ChangedFile, GithubClient};
use std::path::Path;

/// Sentinel path that requests pull-request diff mode when PR context is
/// detectable.
pub const AUTO_MODE: &str = "AUTO";

/// Extensions recognized as source code in diff mode.
const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "rb", "c", "h", "cpp", "hpp", "cs", "php",
    "swift", "kt", "scala", "sh", "sql",
];

/// Body substituted for files GitHub returns without a computable patch.
const NO_PATCH_PLACEHOLDER: &str = "(no patch available for this file)";

/// Whether the code under analysis is a diff or a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLabel {
    /// Unified-diff patches of changed files.
    Diff,
    /// Full text of a single source file.
    FullSource,
}

impl std::fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextLabel::Diff => write!(f, "diff"),
            ContextLabel::FullSource => write!(f, "full_source"),
        }
    }
}

/// The code text handed to the prompt builder, plus its label.
#[derive(Debug, Clone)]
pub struct CodeContext {
    /// Concatenated diff or full file contents.
    pub text: String,
    /// How `text` should be interpreted.
    pub label: ContextLabel,
}

/// Resolve the code context for this run.
///
/// `AUTO` selects diff mode when both a pull-request context and a hosting
/// client are available; otherwise the path is treated as a local file.
pub async fn resolve(
    code_path: &str,
    pr: Option<&PullRequestContext>,
    github: Option<&GithubClient>,
) -> Result<CodeContext> {
    if code_path == AUTO_MODE {
        if let (Some(pr), Some(github)) = (pr, github) {
            return resolve_pull_request(pr, github).await;
        }
        tracing::debug!("AUTO requested without pull-request context, falling back to file mode");
    }

    resolve_local_file(Path::new(code_path))
}

/// Fetch the changed files of a pull request and concatenate their patches.
async fn resolve_pull_request(
    pr: &PullRequestContext,
    github: &GithubClient,
) -> Result<CodeContext> {
    let files = github.list_pull_request_files(pr).await?;
    tracing::debug!("pull request #{} lists {} changed file(s)", pr.number, files.len());

    match render_diff(&files) {
        Some(text) => Ok(CodeContext {
            text,
            label: ContextLabel::Diff,
        }),
        None => Err(DriftError::EmptyContext {
            reason: format!(
                "pull request #{} changed no recognized source files",
                pr.number
            ),
        }),
    }
}

/// Read the full contents of a single local file.
fn resolve_local_file(path: &Path) -> Result<CodeContext> {
    if !path.exists() {
        return Err(DriftError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| DriftError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(DriftError::EmptyContext {
            reason: format!("{} is empty", path.display()),
        });
    }

    Ok(CodeContext {
        text,
        label: ContextLabel::FullSource,
    })
}

/// Concatenate the patches of recognized source files under per-file
/// headers. Returns `None` when no file survives the extension filter.
pub fn render_diff(files: &[ChangedFile]) -> Option<String> {
    let mut out = String::new();

    for file in files.iter().filter(|f| is_code_file(&f.filename)) {
        out.push_str(&format!("--- FILE: {} ---\n", file.filename));
        out.push_str(file.patch.as_deref().unwrap_or(NO_PATCH_PLACEHOLDER));
        out.push_str("\n\n");
    }

    if out.trim().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Whether a filename carries a recognized source-code extension.
pub fn is_code_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(filename: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: filename.to_string(),
            patch: patch.map(str::to_string),
        }
    }

    #[test]
    fn test_is_code_file() {
        assert!(is_code_file("src/auth.py"));
        assert!(is_code_file("lib/Main.JAVA"));
        assert!(!is_code_file("README.md"));
        assert!(!is_code_file("logo.png"));
        assert!(!is_code_file("Makefile"));
    }

    #[test]
    fn test_render_diff_filters_and_labels() {
        let files = vec![
            changed("src/auth.py", Some("@@ -1 +1 @@\n-a\n+b")),
            changed("docs/README.md", Some("@@ -1 +1 @@\n-x\n+y")),
            changed("assets/logo.png", None),
        ];

        let diff = render_diff(&files).unwrap();
        assert!(diff.contains("--- FILE: src/auth.py ---"));
        assert!(diff.contains("+b"));
        assert!(!diff.contains("README.md"));
        assert!(!diff.contains("logo.png"));
    }

    #[test]
    fn test_render_diff_placeholder_for_missing_patch() {
        let files = vec![changed("src/big_generated.rs", None)];
        let diff = render_diff(&files).unwrap();
        assert!(diff.contains(NO_PATCH_PLACEHOLDER));
    }

    #[test]
    fn test_render_diff_empty_when_no_code_files() {
        let files = vec![changed("README.md", Some("@@"))];
        assert!(render_diff(&files).is_none());
    }

    #[tokio::test]
    async fn test_resolve_missing_local_file() {
        let err = resolve("definitely/not/here.py", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DriftError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.py");
        std::fs::write(&path, "if age < 18:\n    reject()\n").unwrap();

        let ctx = resolve(path.to_str().unwrap(), None, None).await.unwrap();
        assert_eq!(ctx.label, ContextLabel::FullSource);
        assert!(ctx.text.contains("age < 18"));
    }

    #[tokio::test]
    async fn test_auto_without_pr_context_falls_back_to_file_mode() {
        let err = resolve(AUTO_MODE, None, None).await.unwrap_err();
        assert!(matches!(err, DriftError::NotFound { .. }));
    }
}

//! Result presentation sinks
//!
//! Fans one canonical [`AnalysisResult`] out to the requested channels:
//! colored terminal report, CI step-summary file, `$GITHUB_OUTPUT`
//! variables, pull-request comment body, strict JSON, and the interactive
//! confirm-and-overwrite of the documentation file. Every sink is a
//! read-only consumer of the result.

pub mod risk;
pub mod slack;

pub use risk::{classify, RiskLevel};

use crate::error::{DriftError, Result};
use crate::llm::AnalysisResult;
use colored::Colorize;
use similar::TextDiff;
use std::io::Write;
use std::path::Path;

/// Render the Markdown audit report shared by the terminal, the step
/// summary, and the pull-request comment.
pub fn render_markdown(result: &AnalysisResult, risk: RiskLevel) -> String {
    let mut out = String::new();

    out.push_str("### 🛡️ Semantic Audit Report\n");
    out.push_str("| Status | Risk Score | Issue |\n");
    out.push_str("| :--- | :--- | :--- |\n");

    if result.has_contradiction {
        out.push_str(&format!(
            "| 🔴 **FAIL** | {} **{}** | {} |\n",
            risk.icon(),
            risk,
            result.reason
        ));

        if let Some(ref suggestion) = result.suggestion {
            out.push_str(&format!("\n**🤖 AI Suggestion:** {}\n", suggestion));
        }

        if let Some(ref fix) = result.suggested_fix {
            out.push_str("\n<details><summary><b>✨ View Self-Healed Documentation</b></summary>\n\n");
            out.push_str(&format!("```markdown\n{}\n```\n", fix));
            out.push_str("\n</details>\n");
        }
    } else {
        out.push_str("| 🟢 **PASS** | 🟢 Low | No contradictions found. |\n");
    }

    out
}

/// Render the pull-request comment body, attributed to the backend that
/// answered so the fallback order stays observable in the thread.
pub fn render_comment(result: &AnalysisResult, risk: RiskLevel) -> String {
    let mut body = render_markdown(result, risk);
    if let Some(ref model) = result.answering_model {
        body.push_str(&format!("\n_Analyzed by `{}`_\n", model));
    }
    body
}

/// Print the human report: colored status line, the Markdown audit table,
/// a diff preview of documentation against the suggested fix, and on
/// failure the mock Slack integration payload.
pub fn print_terminal(result: &AnalysisResult, risk: RiskLevel, doc_text: &str) {
    if result.has_contradiction {
        println!("{}", "✗ FAIL: documentation drift detected".red().bold());
    } else {
        println!("{}", "✓ PASS: documentation matches code".green().bold());
    }
    println!();
    println!("{}", render_markdown(result, risk));

    if let Some(ref fix) = result.suggested_fix {
        println!("{}", "Proposed documentation change:".cyan());
        print!("{}", render_fix_diff(doc_text, fix));
        println!();
    }

    if result.has_contradiction {
        let suggestion = result.suggestion.as_deref().unwrap_or("(none)");
        let payload = slack::alert_payload(&result.reason, risk, suggestion);
        println!("<details><summary><b>🔌 Enterprise Integration (Mock Slack Payload)</b></summary>\n");
        println!("```json\n{}\n```", serde_json::to_string_pretty(&payload).unwrap_or_default());
        println!("\n</details>");
    }
}

/// Unified diff between the current documentation and the suggested fix.
pub fn render_fix_diff(doc_text: &str, fix: &str) -> String {
    TextDiff::from_lines(doc_text, fix)
        .unified_diff()
        .header("documentation (current)", "documentation (suggested)")
        .to_string()
}

/// Append the Markdown report to the CI step-summary file, with a
/// timestamp line so repeated runs in one job stay distinguishable.
/// Append-only: prior content is never truncated.
pub fn append_step_summary(path: &Path, markdown: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DriftError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    writeln!(file, "\n{}\n_Audited at {}_", markdown.trim_end(), stamp).map_err(|source| {
        DriftError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Write the result as output variables for the invoking automation.
pub fn write_outputs(path: &Path, result: &AnalysisResult) -> Result<()> {
    let mut payload = String::new();
    payload.push_str(&encode_output(
        "has_contradiction",
        &result.has_contradiction.to_string(),
    ));
    payload.push_str(&encode_output("reason", &result.reason));
    if let Some(ref fix) = result.suggested_fix {
        payload.push_str(&encode_output("suggested_fix", fix));
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DriftError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    file.write_all(payload.as_bytes()).map_err(|source| DriftError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode one `key=value` output line. Values containing newlines use the
/// heredoc form with a random delimiter, so embedded text cannot corrupt
/// the key=value file.
fn encode_output(key: &str, value: &str) -> String {
    if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter)
    } else {
        format!("{}={}\n", key, value)
    }
}

/// Strict machine-readable rendering of the full result.
pub fn render_json(result: &AnalysisResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

/// Machine-readable rendering of a fatal error: a single object with an
/// `error` key, never mixed with partial result data.
pub fn render_json_error(error: &DriftError) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}

/// Ask the operator whether to overwrite the documentation file with the
/// suggested replacement. Only a literal affirmative applies the write.
/// Returns whether the file was written; write failures are reported, not
/// propagated.
pub fn confirm_and_apply_fix(doc_path: &Path, fix: &str) -> bool {
    print!(
        "Overwrite {} with the suggested documentation? [y/N] ",
        doc_path.display()
    );
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }

    if !is_affirmative(&answer) {
        println!("Skipped. The file was left unchanged.");
        return false;
    }

    match std::fs::write(doc_path, fix) {
        Ok(()) => {
            println!("{} {}", "✓ Updated".green(), doc_path.display());
            true
        }
        Err(e) => {
            eprintln!("{} could not write {}: {}", "✗".red(), doc_path.display(), e);
            false
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_result() -> AnalysisResult {
        AnalysisResult {
            has_contradiction: true,
            reason: "Docs say two-factor is optional; code enforces it.".to_string(),
            suggestion: Some("Remove the 'optional' language.".to_string()),
            suggested_fix: Some("Two-factor authentication is required.".to_string()),
            answering_model: Some("gemini-2.0-flash".to_string()),
        }
    }

    fn passing_result() -> AnalysisResult {
        AnalysisResult {
            has_contradiction: false,
            reason: "No contradictions found.".to_string(),
            suggestion: None,
            suggested_fix: None,
            answering_model: Some("gemini-2.0-flash".to_string()),
        }
    }

    #[test]
    fn test_markdown_fail_report() {
        let md = render_markdown(&failing_result(), RiskLevel::High);
        assert!(md.contains("**FAIL**"));
        assert!(md.contains("🔴 **High**"));
        assert!(md.contains("Self-Healed Documentation"));
        assert!(md.contains("Two-factor authentication is required."));
    }

    #[test]
    fn test_markdown_pass_report() {
        let md = render_markdown(&passing_result(), RiskLevel::Low);
        assert!(md.contains("**PASS**"));
        assert!(!md.contains("Self-Healed"));
    }

    #[test]
    fn test_comment_attributes_model() {
        let body = render_comment(&failing_result(), RiskLevel::High);
        assert!(body.contains("_Analyzed by `gemini-2.0-flash`_"));
    }

    #[test]
    fn test_encode_output_single_line() {
        assert_eq!(encode_output("has_contradiction", "true"), "has_contradiction=true\n");
    }

    #[test]
    fn test_encode_output_multiline_round_trip() {
        let value = "first line\nsecond line\nthird";
        let encoded = encode_output("suggested_fix", value);

        let mut lines = encoded.lines();
        let head = lines.next().unwrap();
        let (key, delimiter) = head.split_once("<<").unwrap();
        assert_eq!(key, "suggested_fix");
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert!(!value.contains(delimiter));

        let body: Vec<&str> = lines.take_while(|l| *l != delimiter).collect();
        assert_eq!(body.join("\n"), value);
        assert!(encoded.trim_end().ends_with(delimiter));
    }

    #[test]
    fn test_write_outputs_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        std::fs::write(&path, "existing=1\n").unwrap();

        write_outputs(&path, &passing_result()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("existing=1\n"));
        assert!(content.contains("has_contradiction=false"));
        assert!(!content.contains("suggested_fix"));
    }

    #[test]
    fn test_step_summary_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        std::fs::write(&path, "## Earlier step\n").unwrap();

        append_step_summary(&path, "### 🛡️ Semantic Audit Report\n").unwrap();
        append_step_summary(&path, "second run\n").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("## Earlier step\n"));
        assert!(content.contains("Semantic Audit Report"));
        assert!(content.contains("second run"));
        assert_eq!(content.matches("_Audited at").count(), 2);
    }

    #[test]
    fn test_render_fix_diff_shows_change() {
        let diff = render_fix_diff("2FA is optional.\n", "2FA is required.\n");
        assert!(diff.contains("-2FA is optional."));
        assert!(diff.contains("+2FA is required."));
    }

    #[test]
    fn test_json_error_shape() {
        let err = DriftError::AllBackendsFailed { attempted: 3 };
        let rendered = render_json_error(&err);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["error"].as_str().unwrap().contains("3"));
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_json_result_round_trip() {
        let rendered = render_json(&failing_result());
        let back: AnalysisResult = serde_json::from_str(&rendered).unwrap();
        assert!(back.has_contradiction);
        assert_eq!(back.answering_model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("YES\n"));
        assert!(!is_affirmative("n\n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yeah\n"));
    }
}

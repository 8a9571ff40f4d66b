//! Audit orchestration
//!
//! Wires the pipeline end to end: configuration, context resolution,
//! prompt, model fallback, normalization, sink fan-out, exit status. The
//! credential check happens before any file or network activity; the
//! documentation file is read before the first network call so a missing
//! doc never costs an API round trip.

use crate::cli::Cli;
use crate::config::Config;
use crate::context;
use crate::error::{DriftError, Result};
use crate::github::GithubClient;
use crate::llm::{self, AnalysisRequest, AnalysisResult};
use crate::report;
use colored::Colorize;

/// Run the audit and return the process exit code.
pub async fn audit(args: &Cli) -> u8 {
    let outcome = run(args).await;

    match &outcome {
        Err(err) if err.is_fatal() => {
            if args.json {
                println!("{}", report::render_json_error(err));
            } else {
                eprintln!("{} {}", "✗ Error:".red().bold(), err);
            }
        }
        Err(err) => {
            // Nothing to analyze; informational, never blocks a merge.
            if args.json {
                eprintln!("{}", err);
            } else {
                println!("{}", format!("ℹ {}", err).cyan());
            }
        }
        Ok(_) => {}
    }

    exit_code(&outcome, args.fail_on_drift)
}

/// Exit-status policy, kept pure for testing.
fn exit_code(outcome: &Result<AnalysisResult>, fail_on_drift: bool) -> u8 {
    match outcome {
        Ok(result) => {
            if result.has_contradiction && fail_on_drift {
                1
            } else {
                0
            }
        }
        Err(err) if err.is_fatal() => 1,
        Err(_) => 0,
    }
}

async fn run(args: &Cli) -> Result<AnalysisResult> {
    let config = Config::from_env()?;

    let doc_path = &args.doc_path;
    if !doc_path.exists() {
        return Err(DriftError::NotFound {
            path: doc_path.clone(),
        });
    }
    let doc_text = std::fs::read_to_string(doc_path).map_err(|source| DriftError::Io {
        path: doc_path.clone(),
        source,
    })?;

    let github = config.github_token.as_deref().map(GithubClient::new);
    let context = context::resolve(
        &args.code_path,
        config.pull_request.as_ref(),
        github.as_ref(),
    )
    .await?;

    if !args.json {
        println!(
            "{}",
            format!(
                "🔍 Analyzing {} ({}) against {}...",
                args.code_path,
                context.label,
                doc_path.display()
            )
            .cyan()
        );
    }

    let request = AnalysisRequest::new(&doc_text, &context.text, context.label);
    let backends = llm::build_backends(&config);
    let (raw, model) = llm::invoke(&request.to_prompt(), &backends).await?;
    let result = llm::normalize(&raw)?.with_model(&model);

    let risk = report::classify(&format!("{} {}", result.reason, context.text));

    if args.json {
        println!("{}", report::render_json(&result));
    } else {
        report::print_terminal(&result, risk, &doc_text);
    }

    if let Some(ref path) = config.step_summary_path {
        if let Err(e) = report::append_step_summary(path, &report::render_markdown(&result, risk)) {
            tracing::warn!("could not append step summary: {}", e);
        }
    }

    if let Some(ref path) = config.output_path {
        if let Err(e) = report::write_outputs(path, &result) {
            tracing::warn!("could not write output variables: {}", e);
        }
    }

    if args.comment {
        match (&github, &config.pull_request) {
            (Some(client), Some(pr)) => {
                let body = report::render_comment(&result, risk);
                if let Err(e) = client.post_issue_comment(pr, &body).await {
                    tracing::warn!("could not post pull-request comment: {}", e);
                }
            }
            _ => {
                tracing::warn!("--comment requested without pull-request context; skipping");
            }
        }
    }

    if args.fix && !args.json {
        if let Some(ref fix) = result.suggested_fix {
            report::confirm_and_apply_fix(doc_path, fix);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drift_result() -> AnalysisResult {
        AnalysisResult {
            has_contradiction: true,
            reason: "docs disagree".to_string(),
            suggestion: None,
            suggested_fix: None,
            answering_model: Some("stub".to_string()),
        }
    }

    #[test]
    fn test_drift_fails_by_default() {
        assert_eq!(exit_code(&Ok(drift_result()), true), 1);
    }

    #[test]
    fn test_drift_passes_when_fail_on_drift_disabled() {
        assert_eq!(exit_code(&Ok(drift_result()), false), 0);
    }

    #[test]
    fn test_clean_result_passes() {
        let result = AnalysisResult {
            has_contradiction: false,
            reason: "ok".to_string(),
            suggestion: None,
            suggested_fix: None,
            answering_model: Some("stub".to_string()),
        };
        assert_eq!(exit_code(&Ok(result), true), 0);
    }

    #[test]
    fn test_empty_context_is_a_no_op() {
        let err = DriftError::EmptyContext {
            reason: "no source files".to_string(),
        };
        assert_eq!(exit_code(&Err(err), true), 0);
    }

    #[test]
    fn test_backend_exhaustion_fails() {
        let err = DriftError::AllBackendsFailed { attempted: 4 };
        assert_eq!(exit_code(&Err(err), true), 1);
        let err = DriftError::Parse {
            detail: "bad json".to_string(),
        };
        assert_eq!(exit_code(&Err(err), false), 1);
    }
}

//! LLM analysis pipeline
//!
//! This module holds the request/result data model, the prompt template,
//! the model backends with sequential fallback, and the normalizer that
//! turns a raw model response into a canonical [`AnalysisResult`].

pub mod client;
pub mod prompts;

pub use client::{build_backends, invoke, GeminiBackend, ModelBackend, StubBackend};

use crate::context::ContextLabel;
use crate::error::{DriftError, Result};
use serde::{Deserialize, Serialize};

/// Everything the model needs to judge one documentation/code pair.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// The documentation excerpt, verbatim.
    pub documentation_text: String,
    /// The code or diff text, verbatim.
    pub code_text: String,
    /// How `code_text` should be interpreted.
    pub context_label: ContextLabel,
}

impl AnalysisRequest {
    /// Create a new analysis request.
    pub fn new(documentation_text: &str, code_text: &str, context_label: ContextLabel) -> Self {
        Self {
            documentation_text: documentation_text.to_string(),
            code_text: code_text.to_string(),
            context_label,
        }
    }

    /// Generate the audit prompt for this request.
    pub fn to_prompt(&self) -> String {
        prompts::build(self)
    }
}

/// Canonical verdict of one audit run. Produced once by the normalizer,
/// consumed read-only by every sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Whether documentation and code semantically contradict each other.
    pub has_contradiction: bool,
    /// Why, in the model's words.
    pub reason: String,
    /// Human-readable fix suggestion, absent without a contradiction.
    pub suggestion: Option<String>,
    /// Full replacement documentation text, absent without a contradiction.
    pub suggested_fix: Option<String>,
    /// Backend that produced the verdict; `None` only in stub contexts.
    pub answering_model: Option<String>,
}

impl AnalysisResult {
    /// Attach the backend that answered.
    pub fn with_model(mut self, model: &str) -> Self {
        self.answering_model = Some(model.to_string());
        self
    }
}

/// Wire shape of the model's JSON verdict. Only `has_contradiction` is
/// required; aliases cover the field-name variants models drift between.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    has_contradiction: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default, alias = "suggested_fix")]
    suggested_fix_description: Option<String>,
    #[serde(default, alias = "updated_documentation")]
    new_doc_content: Option<String>,
}

/// Parse a raw model response into a canonical result.
///
/// Strips enclosing code fences first (both ```` ```json ```` and bare
/// ```` ``` ```` forms), then parses strictly. A failure here is a
/// [`DriftError::Parse`], deliberately distinct from
/// [`DriftError::AllBackendsFailed`]: "the model produced garbage" and
/// "no model was reachable" must stay tellable apart.
pub fn normalize(raw: &str) -> Result<AnalysisResult> {
    let text = strip_code_fences(raw);

    let verdict: RawVerdict =
        serde_json::from_str(text).map_err(|e| DriftError::Parse {
            detail: e.to_string(),
        })?;

    // The fix fields only mean something alongside a contradiction.
    let (suggestion, suggested_fix) = if verdict.has_contradiction {
        (verdict.suggested_fix_description, verdict.new_doc_content)
    } else {
        (None, None)
    };

    Ok(AnalysisResult {
        has_contradiction: verdict.has_contradiction,
        reason: verdict
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "(no reason given)".to_string()),
        suggestion,
        suggested_fix,
        answering_model: None,
    })
}

/// Remove an enclosing Markdown code fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(opened) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the fence line itself ("```json" or bare "```").
    let body = match opened.split_once('\n') {
        Some((_tag, rest)) => rest,
        None => return text,
    };

    match body.rfind("```") {
        Some(idx) => body[..idx].trim(),
        None => body.trim(),
    }
}

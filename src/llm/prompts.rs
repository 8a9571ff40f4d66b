//! Prompt template for the drift audit
//!
//! One deterministic prompt per run: the judging rules, the documentation
//! verbatim, and the code or diff verbatim. The whole text is embedded with
//! no truncation or chunking; oversized inputs fail at the backend and fall
//! through the candidate list.

use crate::context::ContextLabel;
use crate::llm::AnalysisRequest;

const AUDIT_RULES: &str = r#"You are DocGuard, a code compliance auditor. Compare the CODE against the DOCUMENTATION and decide whether they semantically contradict each other.

RULES:
1. Flag ONLY genuine logic contradictions (e.g. the code adds an 'admin_only' check while the docs say the endpoint is public).
2. IGNORE refactors and variable renames.
3. IGNORE omissions: if the code does something the docs are silent about, assume the docs are correct. Do not flag missing details.
4. INFER intent: code reading `if age < 18: reject` matches docs saying "18 or older required". Do not demand literal wording.
5. If the code introduces a NEW feature the docs never mention, propose adding it in the suggestion but do NOT report a contradiction.
6. Output strictly valid JSON, nothing else.
"#;

const OUTPUT_FORMAT: &str = r#"JSON FORMAT:
{
    "has_contradiction": true/false,
    "reason": "concise explanation",
    "suggested_fix_description": "human readable suggestion, or null",
    "new_doc_content": "the FULL updated documentation text with the fix applied, or null if there is no contradiction"
}
"#;

/// Assemble the audit prompt for a request.
pub fn build(request: &AnalysisRequest) -> String {
    let code_header = match request.context_label {
        ContextLabel::Diff => {
            "--- CODE CHANGES (unified diff of the files changed in this pull request) ---"
        }
        ContextLabel::FullSource => "--- CODE (full source file) ---",
    };

    let mut prompt = String::new();
    prompt.push_str(AUDIT_RULES);
    prompt.push('\n');
    prompt.push_str(OUTPUT_FORMAT);
    prompt.push('\n');
    prompt.push_str("--- DOCUMENTATION (source of truth) ---\n");
    prompt.push_str(&request.documentation_text);
    prompt.push_str("\n\n");
    prompt.push_str(code_header);
    prompt.push('\n');
    prompt.push_str(&request.code_text);
    prompt.push('\n');

    prompt
}

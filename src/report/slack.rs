//! Slack-shaped alert payload
//!
//! Rendered into the failure report as a mock enterprise integration; the
//! payload is printed, not posted.

use crate::report::risk::RiskLevel;
use serde_json::{json, Value};

/// Build a Slack block-kit payload describing a drift finding.
pub fn alert_payload(issue: &str, risk: RiskLevel, suggestion: &str) -> Value {
    json!({
        "text": "🚨 *DocGuard Alert: Documentation Drift Detected*",
        "blocks": [
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("*Risk Level:* {}\n*Issue:* {}", risk, issue)
                }
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("*AI Suggestion:* {}", suggestion)
                }
            }
        ]
    })
}

//! Risk classification of a drift finding
//!
//! A keyword scan over the model's reason plus the analyzed code, tiered
//! HIGH > MEDIUM > LOW with first match winning. This is report enrichment
//! only; it never influences the verdict or the exit code.

/// Keywords that mark a finding as high risk.
const HIGH_KEYWORDS: &[&str] = &[
    "auth", "security", "password", "key", "token", "billing", "payment", "admin", "access",
];

/// Keywords that mark a finding as medium risk.
const MEDIUM_KEYWORDS: &[&str] = &[
    "api", "endpoint", "database", "schema", "config", "deprecated",
];

/// Risk tier of a drift finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Touches authentication, billing, or access control.
    High,
    /// Touches API surface, storage, or configuration.
    Medium,
    /// Everything else.
    Low,
}

impl RiskLevel {
    /// Marker icon used in report tables.
    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟠",
            RiskLevel::Low => "🟢",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::Low => write!(f, "Low"),
        }
    }
}

/// Classify a finding by scanning `text` for sensitive keywords.
pub fn classify(text: &str) -> RiskLevel {
    let text = text.to_lowercase();

    if HIGH_KEYWORDS.iter().any(|k| text.contains(k)) {
        RiskLevel::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| text.contains(k)) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

//! Error taxonomy for DocGuard
//!
//! Every failure mode of the audit pipeline maps onto one of these
//! variants, and each variant has a fixed exit-code policy. The two
//! "model went wrong" cases are deliberately separate: `AllBackendsFailed`
//! means no backend was reachable, `Parse` means a backend answered but the
//! output was not valid JSON. Collapsing them would make an outage look
//! like a passing audit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DocGuard operations.
pub type Result<T> = std::result::Result<T, DriftError>;

/// All failure modes of a DocGuard run.
#[derive(Error, Debug)]
pub enum DriftError {
    /// A required environment variable (API credential) is not set.
    #[error("environment variable {name} is not set")]
    MissingCredential {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// A local input file does not exist or could not be read.
    #[error("file not found: {path}")]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// Context resolution produced no code to analyze.
    #[error("nothing to analyze: {reason}")]
    EmptyContext {
        /// Why no content was produced.
        reason: String,
    },

    /// The repository-hosting API returned a non-success status.
    #[error("hosting API request failed: HTTP {status} for {endpoint}")]
    HostingApi {
        /// HTTP status code returned.
        status: u16,
        /// The endpoint that was called.
        endpoint: String,
    },

    /// A single model backend failed. Recovered by the invoker; only
    /// surfaced wrapped in `AllBackendsFailed`.
    #[error("model backend '{backend}' failed: {reason}")]
    BackendRequest {
        /// Identifier of the backend that failed.
        backend: String,
        /// Failure description from the transport or API.
        reason: String,
    },

    /// Every configured model backend was attempted and none succeeded.
    #[error("all {attempted} model backend(s) failed; no analysis produced")]
    AllBackendsFailed {
        /// Number of candidates that were tried.
        attempted: usize,
    },

    /// A backend answered, but the response was not valid JSON after
    /// fence stripping.
    #[error("model returned unparseable output: {detail}")]
    Parse {
        /// Parser diagnostic.
        detail: String,
    },

    /// An I/O failure outside the "file not found" case.
    #[error("I/O error for '{path}': {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DriftError {
    /// Whether this error terminates the run with a non-zero exit code.
    ///
    /// `EmptyContext` and `HostingApi` are informational: a pull request
    /// that touches no recognized source files must not block a merge.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DriftError::EmptyContext { .. } | DriftError::HostingApi { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_is_informational() {
        let err = DriftError::EmptyContext {
            reason: "no code files changed".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_hosting_api_is_informational() {
        let err = DriftError::HostingApi {
            status: 404,
            endpoint: "/repos/x/y/pulls/1/files".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_backend_errors_are_fatal_and_distinct() {
        let failed = DriftError::AllBackendsFailed { attempted: 3 };
        let parse = DriftError::Parse {
            detail: "EOF while parsing".to_string(),
        };

        assert!(failed.is_fatal());
        assert!(parse.is_fatal());
        assert_ne!(failed.to_string(), parse.to_string());
    }

    #[test]
    fn test_missing_credential_message_names_variable() {
        let err = DriftError::MissingCredential {
            name: "GEMINI_API_KEY",
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}

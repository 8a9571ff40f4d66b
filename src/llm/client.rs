//! Model backends and sequential fallback
//!
//! Each candidate model is one `ModelBackend`. The invoker walks the list
//! in order, one request per candidate, no retries and no backoff, and
//! returns the first successful raw response together with the id of the
//! backend that produced it.

use crate::config::Config;
use crate::error::{DriftError, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One model endpoint able to judge a prompt and return structured output.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Stable identifier recorded as `answering_model` on success.
    fn id(&self) -> &str;

    /// Issue a single structured-output request.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Try each backend in order; first success wins.
///
/// Failed attempts are logged as warnings and never surfaced individually.
/// An exhausted list is `AllBackendsFailed`, which callers must keep
/// distinct from a passing verdict.
pub async fn invoke(
    prompt: &str,
    backends: &[Box<dyn ModelBackend>],
) -> Result<(String, String)> {
    for backend in backends {
        match backend.generate(prompt).await {
            Ok(raw) => {
                tracing::debug!("backend '{}' answered ({} bytes)", backend.id(), raw.len());
                return Ok((raw, backend.id().to_string()));
            }
            Err(e) => {
                let err = DriftError::BackendRequest {
                    backend: backend.id().to_string(),
                    reason: format!("{:#}", e),
                };
                tracing::warn!("{}", err);
            }
        }
    }

    Err(DriftError::AllBackendsFailed {
        attempted: backends.len(),
    })
}

/// Build the backend list from configuration, sharing one HTTP client.
pub fn build_backends(config: &Config) -> Vec<Box<dyn ModelBackend>> {
    let client = reqwest::Client::new();
    config
        .models
        .iter()
        .map(|model| {
            Box::new(GeminiBackend::new(client.clone(), &config.api_key, model))
                as Box<dyn ModelBackend>
        })
        .collect()
}

/// Backend for one Gemini model, speaking the `generateContent` API with
/// JSON output enforced.
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a backend for `model` against the public API.
    pub fn new(client: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self::with_base_url(client, api_key, model, GEMINI_API_BASE)
    }

    /// Create a backend against a custom base URL (used by tests).
    pub fn with_base_url(
        client: reqwest::Client,
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini request failed: {} - {}", status, truncate(&body, 300));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .context("failed to parse Gemini response")?;

        let text = result
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|c| c.content.and_then(|content| content.parts).unwrap_or_default())
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            anyhow::bail!("Gemini returned no text content");
        }

        Ok(text)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// Gemini generateContent API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Deterministic backend for tests: answers with a canned response or
/// fails, and counts how often it was asked.
pub struct StubBackend {
    id: String,
    response: Option<String>,
    calls: std::sync::atomic::AtomicUsize,
}

impl StubBackend {
    /// A stub that always succeeds with `response`.
    pub fn succeeding(id: &str, response: &str) -> Self {
        Self {
            id: id.to_string(),
            response: Some(response.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A stub that always fails.
    pub fn failing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            response: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times `generate` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.response {
            Some(r) => Ok(r.clone()),
            None => anyhow::bail!("stub backend '{}' configured to fail", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct SharedStub(Arc<StubBackend>);

    #[async_trait]
    impl ModelBackend for SharedStub {
        fn id(&self) -> &str {
            self.0.id()
        }

        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.0.generate(prompt).await
        }
    }

    #[tokio::test]
    async fn test_invoke_stops_at_first_success() {
        let a = Arc::new(StubBackend::failing("model-a"));
        let b = Arc::new(StubBackend::failing("model-b"));
        let c = Arc::new(StubBackend::succeeding("model-c", r#"{"ok": true}"#));
        let d = Arc::new(StubBackend::succeeding("model-d", r#"{"ok": true}"#));

        let backends: Vec<Box<dyn ModelBackend>> = vec![
            Box::new(SharedStub(a.clone())),
            Box::new(SharedStub(b.clone())),
            Box::new(SharedStub(c.clone())),
            Box::new(SharedStub(d.clone())),
        ];

        let (raw, model) = invoke("prompt", &backends).await.unwrap();
        assert_eq!(model, "model-c");
        assert_eq!(raw, r#"{"ok": true}"#);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
        assert_eq!(c.calls(), 1);
        assert_eq!(d.calls(), 0);
    }

    #[tokio::test]
    async fn test_invoke_exhausted_list_is_distinct_error() {
        let backends: Vec<Box<dyn ModelBackend>> = vec![
            Box::new(StubBackend::failing("model-a")),
            Box::new(StubBackend::failing("model-b")),
            Box::new(StubBackend::failing("model-c")),
        ];

        let err = invoke("prompt", &backends).await.unwrap_err();
        assert!(matches!(err, DriftError::AllBackendsFailed { attempted: 3 }));
    }

    #[tokio::test]
    async fn test_invoke_empty_candidate_list() {
        let backends: Vec<Box<dyn ModelBackend>> = Vec::new();
        let err = invoke("prompt", &backends).await.unwrap_err();
        assert!(matches!(err, DriftError::AllBackendsFailed { attempted: 0 }));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("short", 300), "short");
    }
}

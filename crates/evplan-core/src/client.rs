//! Generative-language endpoint client.
//!
//! [`GenerativeClient`] is the seam the pipeline calls through; the concrete
//! [`GeminiClient`] speaks the `generateContent` REST shape:
//!
//! ```text
//! POST {base_url}/v1beta/models/{model}:generateContent?key={api_key}
//!   { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//! 200
//!   { "candidates": [ { "content": { "parts": [ { "text": "<reply>" } ] } } ] }
//! ```
//!
//! One request per call: no timeout, no retry. Any non-2xx status is a
//! network error and its body is never read.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlanError;

/// Something that turns a prompt into model text.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send `prompt` and return the model's reply text.
    async fn generate_text(&self, prompt: &str) -> Result<String, PlanError>;
}

// Compile-time assertion: GenerativeClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn GenerativeClient) {}
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Endpoint settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiConfig {
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

    /// Config for the public endpoint and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            api_key: api_key.into(),
        }
    }

    /// The `generateContent` URL, without the key query parameter.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Build the request body for `prompt`.
fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart { text: prompt }],
        }],
    }
}

/// Pull the reply text out of a `generateContent` response body.
///
/// Concatenates the text parts of the first candidate.
pub fn candidate_text(body: &str) -> Result<String, PlanError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        PlanError::MalformedResponse(format!("response envelope is not valid JSON: {e}"))
    })?;

    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .unwrap_or_default()
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(PlanError::MalformedResponse(
            "response contained no candidate text".to_string(),
        ));
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, PlanError> {
        let client = Client::builder()
            .build()
            .map_err(|e| PlanError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, PlanError> {
        let url = self.config.endpoint_url();
        debug!(url = %url, prompt_len = prompt.len(), "sending generateContent request");

        // `without_url` keeps the API key (a query parameter) out of messages.
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| PlanError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlanError::Network(format!("endpoint returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlanError::Network(e.without_url().to_string()))?;
        debug!(bytes = body.len(), "received generateContent response");

        candidate_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_uses_model_and_trims_slash() {
        let cfg = GeminiConfig {
            base_url: "http://127.0.0.1:9999/".to_string(),
            model: "test-model".to_string(),
            api_key: "k".to_string(),
        };
        assert_eq!(
            cfg.endpoint_url(),
            "http://127.0.0.1:9999/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn default_config_targets_public_endpoint() {
        let cfg = GeminiConfig::new("secret");
        assert!(cfg.endpoint_url().starts_with(GeminiConfig::DEFAULT_BASE_URL));
        assert!(cfg.endpoint_url().contains(GeminiConfig::DEFAULT_MODEL));
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = GeminiConfig::new("super-secret-key");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret-key"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn request_body_has_expected_shape() {
        let value = serde_json::to_value(request_body("hello")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "contents": [ { "parts": [ { "text": "hello" } ] } ] })
        );
    }

    #[test]
    fn candidate_text_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(candidate_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn candidate_text_rejects_empty_candidates() {
        assert!(matches!(
            candidate_text(r#"{"candidates":[]}"#),
            Err(PlanError::MalformedResponse(_))
        ));
        assert!(matches!(
            candidate_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(PlanError::MalformedResponse(_))
        ));
    }

    #[test]
    fn candidate_text_rejects_non_json_envelope() {
        assert!(matches!(
            candidate_text("<html>oops</html>"),
            Err(PlanError::MalformedResponse(_))
        ));
    }
}

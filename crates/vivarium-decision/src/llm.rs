//! LLM backend implementations.
//!
//! Enum-based dispatch over the two wire formats in use: OpenAI-compatible
//! chat completions and the Anthropic Messages API. Both communicate over
//! HTTP via `reqwest`. The caller does not care which model answers -- it
//! sends a prompt and expects text back; everything else (timeouts,
//! fallbacks) lives in [`service`](crate::service).

use serde::Deserialize;

use crate::service::DecisionRequest;

/// Which wire format a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// OpenAI-compatible chat completions (`OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

/// Connection settings for one backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmBackendConfig {
    /// Wire format.
    pub kind: BackendKind,
    /// Base API URL (without the endpoint path).
    pub api_url: String,
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
}

/// An LLM backend that can process a prompt and return response text.
///
/// Uses enum dispatch instead of trait objects because async methods are
/// not dyn-compatible.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Build a backend from configuration.
    pub fn from_config(config: &LlmBackendConfig) -> Self {
        match config.kind {
            BackendKind::OpenAi => Self::OpenAi(OpenAiBackend::new(config)),
            BackendKind::Anthropic => Self::Anthropic(AnthropicBackend::new(config)),
        }
    }

    /// Send a request and return the raw response text.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the HTTP call fails or the response
    /// cannot be extracted; the service layer converts this into
    /// unavailability, never a crash.
    pub async fn complete(&self, request: &DecisionRequest) -> Result<String, BackendError> {
        match self {
            Self::OpenAi(backend) => backend.complete(request).await,
            Self::Anthropic(backend) => backend.complete(request).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

/// A failed backend call; converted to unavailability by the service.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

/// System line sent with every request.
const SYSTEM_PROMPT: &str =
    "You are the decision oracle for a simulated world. Answer concisely.";

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &DecisionRequest) -> Result<String, BackendError> {
        let url = format!("{}/chat/completions", self.api_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": request.prompt}
            ],
            "temperature": 0.7,
            "max_tokens": request.max_tokens,
        });
        if request.structured_output
            && let Some(obj) = body.as_object_mut()
        {
            obj.insert(
                String::from("response_format"),
                serde_json::json!({"type": "json_object"}),
            );
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(BackendError(format!("returned {status}: {error_body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError(format!("response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an OpenAI chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, BackendError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| BackendError(String::from("missing choices[0].message.content")))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Differences from the OpenAI format: `x-api-key` header instead of a
/// bearer token, system as a top-level field, and `content[0].text` in
/// the response.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, request: &DecisionRequest) -> Result<String, BackendError> {
        let url = format!("{}/messages", self.api_url);

        // The Messages API has no JSON mode; structured requests lean on
        // the prompt itself demanding JSON.
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": request.prompt}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(BackendError(format!("returned {status}: {error_body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError(format!("response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, BackendError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| BackendError(String::from("missing content[0].text")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extract_openai_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": {"content": "the winner is Asha"}
            }]
        });
        assert_eq!(
            extract_openai_content(&json).unwrap(),
            "the winner is Asha"
        );
    }

    #[test]
    fn extract_openai_content_missing() {
        let json = serde_json::json!({"choices": []});
        assert!(extract_openai_content(&json).is_err());
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "narration"}]
        });
        assert_eq!(extract_anthropic_content(&json).unwrap(), "narration");
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn backend_names() {
        let config = LlmBackendConfig {
            kind: BackendKind::OpenAi,
            api_url: String::from("http://localhost"),
            api_key: String::new(),
            model: String::from("test"),
        };
        assert_eq!(LlmBackend::from_config(&config).name(), "openai-compatible");
    }
}

//! Anthropic Messages API client.
//!
//! Serves the `claude` identifier against the native Anthropic Messages API.
//!
//! Key differences from OpenAI-compatible APIs:
//! - Auth via `x-api-key` header (not `Authorization: Bearer`)
//! - Required `anthropic-version` header
//! - System instruction is a top-level `system` field, not a message
//! - Response text arrives as an array of content blocks

use crate::config::{ModelId, ModelSettings};
use crate::error::ProviderError;
use crate::providers::{ProviderClient, http_client, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// The default Anthropic API base URL.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// The required Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Response token ceiling; the Messages API requires an explicit value.
const MAX_TOKENS: usize = 8192;

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl AnthropicClient {
    /// Create a new client from settings and a pre-resolved API key.
    pub fn new(settings: &ModelSettings, api_key: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(settings.timeout())?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: settings.model_name.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Build the JSON request body for the Messages API.
    ///
    /// The system instruction, if present, becomes the top-level `system` field.
    fn build_request_body(&self, prompt: &str, system: Option<&str>) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(system) = system {
            body["system"] = Value::String(system.to_string());
        }
        body
    }

    /// Extract the response text from a Messages API response body.
    ///
    /// Concatenates the text of every `"text"`-typed content block.
    fn parse_response(body: &Value) -> Result<String, ProviderError> {
        let blocks = body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "Missing 'content' array in response".to_string(),
            })?;

        let text: String = blocks
            .iter()
            .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::ResponseParse {
                message: "No text blocks in response content".to_string(),
            });
        }
        Ok(text)
    }

    /// Map a non-success HTTP status to a `ProviderError`.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed {
                provider: "Anthropic".to_string(),
            },
            status => ProviderError::ApiRequest {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn run(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError> {
        let url = format!("{}/messages", self.base_url);
        let body = self.build_request_body(prompt, system);

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending Anthropic request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| ProviderError::ApiRequest {
            message: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &response_body));
        }

        let json: Value =
            serde_json::from_str(&response_body).map_err(|e| ProviderError::ResponseParse {
                message: format!("Invalid JSON: {e}"),
            })?;

        Self::parse_response(&json)
    }

    fn id(&self) -> ModelId {
        ModelId::Claude
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    fn test_client() -> AnthropicClient {
        let config = RunConfig::default();
        AnthropicClient::new(&config.claude, "sk-ant-test").unwrap()
    }

    #[test]
    fn test_build_request_body_with_system() {
        let client = test_client();
        let body = client.build_request_body("the prompt", Some("the system"));
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["system"], "the system");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "the prompt");
        assert!(body["max_tokens"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_build_request_body_without_system() {
        let client = test_client();
        let body = client.build_request_body("the prompt", None);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_single_text_block() {
        let body = json!({
            "id": "msg_123",
            "content": [{ "type": "text", "text": "Research findings here." }],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 20 }
        });
        let text = AnthropicClient::parse_response(&body).unwrap();
        assert_eq!(text, "Research findings here.");
    }

    #[test]
    fn test_parse_multiple_text_blocks() {
        let body = json!({
            "content": [
                { "type": "text", "text": "Part one. " },
                { "type": "text", "text": "Part two." }
            ]
        });
        let text = AnthropicClient::parse_response(&body).unwrap();
        assert_eq!(text, "Part one. Part two.");
    }

    #[test]
    fn test_parse_response_missing_content() {
        let body = json!({ "id": "msg_123" });
        let err = AnthropicClient::parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseParse { .. }));
    }

    #[test]
    fn test_parse_response_no_text_blocks() {
        let body = json!({ "content": [] });
        let err = AnthropicClient::parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseParse { .. }));
    }

    #[test]
    fn test_map_http_error_auth() {
        let err = AnthropicClient::map_http_error(reqwest::StatusCode::FORBIDDEN, "denied");
        assert!(matches!(err, ProviderError::AuthFailed { .. }));
    }
}

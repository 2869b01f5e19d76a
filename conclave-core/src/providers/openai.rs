//! OpenAI chat completions client.
//!
//! Serves the `gpt` identifier against the OpenAI chat completions API.
//! The system instruction travels as a `"system"`-role message ahead of the
//! user prompt.

use crate::config::{ModelId, ModelSettings};
use crate::error::ProviderError;
use crate::providers::{ProviderClient, http_client, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// The default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiClient {
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

    /// Build the JSON request body for the chat completions endpoint.
    fn build_request_body(&self, prompt: &str, system: Option<&str>) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.model,
            "messages": messages,
        })
    }

    /// Extract the response text from a chat completions response body.
    fn parse_response(body: &Value) -> Result<String, ProviderError> {
        let message = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "No choices in response".to_string(),
            })?;

        message
            .get("content")
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "No text content in response message".to_string(),
            })
    }

    /// Map a non-success HTTP status to a `ProviderError`.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed {
                provider: "OpenAI".to_string(),
            },
            status => ProviderError::ApiRequest {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    async fn run(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(prompt, system);

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending OpenAI request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
        ModelId::Gpt
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    fn test_client() -> OpenAiClient {
        let config = RunConfig::default();
        OpenAiClient::new(&config.gpt, "sk-test").unwrap()
    }

    #[test]
    fn test_build_request_body_with_system() {
        let client = test_client();
        let body = client.build_request_body("the prompt", Some("the system"));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "the system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "the prompt");
    }

    #[test]
    fn test_build_request_body_without_system() {
        let client = test_client();
        let body = client.build_request_body("just the prompt", None);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_parse_text_response() {
        let body = json!({
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Here is my research." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8 },
            "model": "gpt-4o"
        });
        let text = OpenAiClient::parse_response(&body).unwrap();
        assert_eq!(text, "Here is my research.");
    }

    #[test]
    fn test_parse_response_no_choices() {
        let body = json!({ "choices": [] });
        let err = OpenAiClient::parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseParse { .. }));
    }

    #[test]
    fn test_parse_response_null_content() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        });
        let err = OpenAiClient::parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseParse { .. }));
    }

    #[test]
    fn test_map_http_error_auth() {
        let err = OpenAiClient::map_http_error(reqwest::StatusCode::UNAUTHORIZED, "denied");
        assert!(matches!(err, ProviderError::AuthFailed { .. }));
    }

    #[test]
    fn test_map_http_error_server() {
        let err =
            OpenAiClient::map_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops");
        match err {
            ProviderError::ApiRequest { message } => {
                assert!(message.contains("500"));
                assert!(message.contains("oops"));
            }
            other => panic!("Expected ApiRequest, got {other:?}"),
        }
    }
}

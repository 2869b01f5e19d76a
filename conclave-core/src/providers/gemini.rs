//! Google Gemini API client.
//!
//! Serves the `gemini` identifier against the Gemini generateContent API.
//!
//! Key differences from OpenAI-compatible APIs:
//! - Auth via `?key=API_KEY` query parameter (not header-based)
//! - System instruction is a top-level `system_instruction` field
//! - Response text arrives as `candidates[0].content.parts[*].text`
//! - A blocked prompt is reported via `promptFeedback.blockReason`

use crate::config::{ModelId, ModelSettings};
use crate::error::ProviderError;
use crate::providers::{ProviderClient, http_client, map_transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiClient {
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

    /// Build the JSON request body for the generateContent endpoint.
    fn build_request_body(&self, prompt: &str, system: Option<&str>) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });
        if let Some(system) = system {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }
        body
    }

    /// Extract the response text from a generateContent response body.
    fn parse_response(body: &Value) -> Result<String, ProviderError> {
        // A blocked prompt has no candidates; surface the block reason.
        if let Some(reason) = body
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
        {
            return Err(ProviderError::ApiRequest {
                message: format!("Prompt blocked by Gemini: {reason}"),
            });
        }

        let parts = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "No candidates in response".to_string(),
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::ResponseParse {
                message: "Empty response text".to_string(),
            });
        }
        Ok(text)
    }

    /// Map a non-success HTTP status to a `ProviderError`.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed {
                provider: "Gemini".to_string(),
            },
            status => ProviderError::ApiRequest {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn run(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = self.build_request_body(prompt, system);

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
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
        ModelId::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

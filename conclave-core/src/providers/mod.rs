//! Provider client implementations.
//!
//! Every model backend satisfies the same [`ProviderClient`] contract:
//! a single synchronous-in-effect call `run(prompt, system) -> text` with no
//! schema enforced on the response content. Concrete implementations:
//! - `OpenAiClient` — OpenAI chat completions API (the `gpt` identifier)
//! - `AnthropicClient` — Anthropic Messages API (the `claude` identifier)
//! - `GeminiClient` — Google Gemini API (the `gemini` identifier)
//! - `UnsupportedClient` — deterministic stub for declared-but-unimplemented
//!   providers (`perplexity`, `grok`)
//!
//! Use [`create_client`] to instantiate the appropriate client for an identifier.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::config::{ModelId, ModelSettings};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Uniform call contract every model backend must satisfy.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Send a prompt (and optional system instruction) and return the raw
    /// textual response.
    async fn run(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError>;

    /// The identifier this client serves.
    fn id(&self) -> ModelId;

    /// The concrete model name sent to the provider API.
    fn model_name(&self) -> &str;
}

/// Create the client for an identifier from its settings and credential.
pub fn create_client(
    id: ModelId,
    settings: &ModelSettings,
    api_key: &str,
) -> Result<Arc<dyn ProviderClient>, ProviderError> {
    match id {
        ModelId::Gpt => Ok(Arc::new(OpenAiClient::new(settings, api_key)?)),
        ModelId::Claude => Ok(Arc::new(AnthropicClient::new(settings, api_key)?)),
        ModelId::Gemini => Ok(Arc::new(GeminiClient::new(settings, api_key)?)),
        ModelId::Perplexity | ModelId::Grok => {
            Ok(Arc::new(UnsupportedClient::new(id, settings)))
        }
    }
}

/// Build an HTTP client with the configured per-call timeout.
///
/// Timeout expiry surfaces through the same `ProviderError` path as any other
/// transport failure, so callers need no separate deadline handling.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ProviderError::Connection {
            message: format!("Failed to build HTTP client: {e}"),
        })
}

/// Map a transport-level `reqwest` error to a `ProviderError`.
pub(crate) fn map_transport_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout { timeout_secs }
    } else {
        ProviderError::Connection {
            message: format!("Request failed: {e}"),
        }
    }
}

/// Stub client for providers that are declared but not yet implemented.
///
/// Always fails immediately with `ProviderError::NotSupported`, without
/// attempting any network I/O. Lets a provider be configured (and hold a
/// credential) before an implementation exists.
pub struct UnsupportedClient {
    id: ModelId,
    model_name: String,
}

impl UnsupportedClient {
    pub fn new(id: ModelId, settings: &ModelSettings) -> Self {
        Self {
            id,
            model_name: settings.model_name.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for UnsupportedClient {
    async fn run(&self, _prompt: &str, _system: Option<&str>) -> Result<String, ProviderError> {
        Err(ProviderError::NotSupported { id: self.id })
    }

    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// A call observed by [`MockClient`], for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: Option<String>,
}

/// A mock provider client for testing and development.
///
/// Returns queued results in order and records every call it receives.
pub struct MockClient {
    id: ModelId,
    model_name: String,
    responses: std::sync::Mutex<Vec<Result<String, ProviderError>>>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

impl MockClient {
    pub fn new(id: ModelId) -> Self {
        Self {
            id,
            model_name: format!("mock-{}", id.as_str()),
            responses: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A mock that always returns the given text.
    ///
    /// Queues multiple copies so it can serve several calls.
    pub fn with_response(id: ModelId, text: &str) -> Self {
        let client = Self::new(id);
        for _ in 0..20 {
            client.queue(Ok(text.to_string()));
        }
        client
    }

    /// A mock whose every call fails with an opaque request error.
    pub fn failing(id: ModelId) -> Self {
        let client = Self::new(id);
        for _ in 0..20 {
            client.queue(Err(ProviderError::ApiRequest {
                message: format!("mock failure for {id}"),
            }));
        }
        client
    }

    /// Queue a result to be returned by the next `run` call.
    pub fn queue(&self, result: Result<String, ProviderError>) {
        self.responses.lock().unwrap().push(result);
    }

    /// All calls observed so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    async fn run(&self, prompt: &str, system: Option<&str>) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            system: system.map(|s| s.to_string()),
        });
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!("mock response from {}", self.id))
        } else {
            responses.remove(0)
        }
    }

    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

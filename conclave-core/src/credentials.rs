//! Credential mapping for provider API keys.
//!
//! The core never reads the process environment itself: [`ApiKeys::collect`]
//! takes an injected lookup function, so the caller decides where credentials
//! come from (environment variables in the CLI, a plain map in tests).

use crate::config::ModelId;
use std::collections::BTreeMap;

/// Environment variable expected to hold each model's API key.
pub fn env_var_name(id: ModelId) -> &'static str {
    match id {
        ModelId::Gpt => "OPENAI_API_KEY",
        ModelId::Claude => "ANTHROPIC_API_KEY",
        ModelId::Gemini => "GOOGLE_API_KEY",
        ModelId::Perplexity => "PERPLEXITY_API_KEY",
        ModelId::Grok => "GROK_API_KEY",
    }
}

/// Opaque credential mapping from model identifier to API key.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: BTreeMap<ModelId, String>,
}

impl ApiKeys {
    /// Create an empty credential mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect credentials for every known identifier using the given lookup.
    ///
    /// Values are stripped of surrounding whitespace; absent, empty, or
    /// whitespace-only values are omitted.
    pub fn collect(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut keys = BTreeMap::new();
        for id in ModelId::ALL {
            if let Some(value) = lookup(env_var_name(id)) {
                let value = value.trim();
                if !value.is_empty() {
                    keys.insert(id, value.to_string());
                }
            }
        }
        Self { keys }
    }

    /// Insert a credential for the given identifier.
    pub fn insert(&mut self, id: ModelId, key: impl Into<String>) {
        self.keys.insert(id, key.into());
    }

    /// The credential for the given identifier, if present.
    pub fn get(&self, id: ModelId) -> Option<&str> {
        self.keys.get(&id).map(String::as_str)
    }

    /// Whether a credential is present for the given identifier.
    pub fn contains(&self, id: ModelId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Number of credentials present.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no credentials are present.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

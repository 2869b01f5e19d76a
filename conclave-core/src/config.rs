//! Run configuration for the conclave pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment variables.
//!
//! Model identity is a closed enumeration ([`ModelId`]); per-model settings
//! live in named fields on [`RunConfig`] with a typed accessor instead of
//! string-keyed lookup.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Closed set of model identifiers supported by the pipeline.
///
/// Every identifier appearing in configuration, the client registry, or
/// artifact naming belongs to this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Gpt,
    Claude,
    Gemini,
    Perplexity,
    Grok,
}

impl ModelId {
    /// All identifiers, in canonical order.
    pub const ALL: [ModelId; 5] = [
        ModelId::Gpt,
        ModelId::Claude,
        ModelId::Gemini,
        ModelId::Perplexity,
        ModelId::Grok,
    ];

    /// Lowercase identifier string, stable across configuration and artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt => "gpt",
            ModelId::Claude => "claude",
            ModelId::Gemini => "gemini",
            ModelId::Perplexity => "perplexity",
            ModelId::Grok => "grok",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-model settings, immutable once a run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Whether this model participates at all.
    pub enabled: bool,
    /// Concrete model name sent to the provider API.
    pub model_name: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional provider-specific instruction fragment appended to the
    /// primary-research prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

fn default_timeout_secs() -> u64 {
    600
}

impl ModelSettings {
    fn new(enabled: bool, model_name: &str) -> Self {
        Self {
            enabled,
            model_name: model_name.to_string(),
            timeout_secs: default_timeout_secs(),
            instruction: None,
        }
    }

    /// Per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Run-wide configuration: which models research, who reviews, who synthesizes.
///
/// The reviewer fields are a forward-compatibility seam: fixed defaults today,
/// configurable without touching stage logic later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Models queried during primary research, in invocation order. No duplicates.
    pub primary_models: Vec<ModelId>,
    /// Model performing final synthesis. Need not be a member of `primary_models`.
    pub chairman_model: ModelId,
    /// Model performing the structural (aggregative) meta-review.
    #[serde(default = "default_structural_reviewer")]
    pub structural_reviewer: ModelId,
    /// Model performing the interpretive (critical) meta-review.
    #[serde(default = "default_interpretive_reviewer")]
    pub interpretive_reviewer: ModelId,

    // Named fields per identifier, accessed via `model_settings()`.
    pub gpt: ModelSettings,
    pub claude: ModelSettings,
    pub gemini: ModelSettings,
    pub perplexity: ModelSettings,
    pub grok: ModelSettings,
}

fn default_structural_reviewer() -> ModelId {
    ModelId::Claude
}

fn default_interpretive_reviewer() -> ModelId {
    ModelId::Gpt
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            primary_models: vec![ModelId::Gpt, ModelId::Claude],
            chairman_model: ModelId::Gpt,
            structural_reviewer: default_structural_reviewer(),
            interpretive_reviewer: default_interpretive_reviewer(),
            gpt: ModelSettings::new(true, "gpt-4o"),
            claude: ModelSettings::new(true, "claude-sonnet-4-20250514"),
            gemini: ModelSettings::new(false, "gemini-1.5-pro"),
            perplexity: ModelSettings::new(false, "sonar-pro"),
            grok: ModelSettings::new(false, "grok-2"),
        }
    }
}

impl RunConfig {
    /// Settings for the given identifier.
    pub fn model_settings(&self, id: ModelId) -> &ModelSettings {
        match id {
            ModelId::Gpt => &self.gpt,
            ModelId::Claude => &self.claude,
            ModelId::Gemini => &self.gemini,
            ModelId::Perplexity => &self.perplexity,
            ModelId::Grok => &self.grok,
        }
    }

    /// Every identifier the registry must resolve: the primary models plus
    /// the chairman and both reviewers, deduplicated in first-seen order.
    pub fn referenced_models(&self) -> Vec<ModelId> {
        let mut referenced = self.primary_models.clone();
        for id in [
            self.chairman_model,
            self.structural_reviewer,
            self.interpretive_reviewer,
        ] {
            if !referenced.contains(&id) {
                referenced.push(id);
            }
        }
        referenced
    }

    /// Validate configuration consistency.
    ///
    /// Checks that at least one primary model is configured, that no model
    /// appears twice, and that the chairman and both reviewers are enabled.
    /// The chairman is deliberately not required to be a primary model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_models.is_empty() {
            return Err(ConfigError::Invalid {
                message: "primary_models must contain at least one model".to_string(),
            });
        }
        for (i, id) in self.primary_models.iter().enumerate() {
            if self.primary_models[..i].contains(id) {
                return Err(ConfigError::Invalid {
                    message: format!("primary_models contains duplicate model '{id}'"),
                });
            }
        }
        for (role, id) in [
            ("chairman_model", self.chairman_model),
            ("structural_reviewer", self.structural_reviewer),
            ("interpretive_reviewer", self.interpretive_reviewer),
        ] {
            if !self.model_settings(id).enabled {
                return Err(ConfigError::Invalid {
                    message: format!("{role} '{id}' is not enabled"),
                });
            }
        }
        Ok(())
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `CONCLAVE_`, nested with `__`)
/// 3. Workspace-local config (`.conclave/config.toml`)
/// 4. User config (`~/.config/conclave/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&RunConfig>,
) -> Result<RunConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(RunConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "conclave", "conclave") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".conclave").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (CONCLAVE_CHAIRMAN_MODEL, CONCLAVE_GPT__MODEL_NAME, etc.)
    figment = figment.merge(Env::prefixed("CONCLAVE_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

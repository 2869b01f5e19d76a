//! Error types for the conclave core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the configuration, provider, and pipeline domains.

use crate::config::ModelId;
use crate::pipeline::RunPhase;

/// Top-level error type for the conclave core library.
#[derive(Debug, thiserror::Error)]
pub enum ConclaveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system and registry construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An enabled, referenced model has no credential. Registry construction
    /// is all-or-nothing, so this aborts the whole build.
    #[error("Missing credential for model '{id}' (expected in env var '{env_var}')")]
    MissingCredential { id: ModelId, env_var: &'static str },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// A reviewer or chairman identifier did not resolve to a built client.
    #[error("Reviewer model '{id}' is not available in the client registry")]
    ReviewerUnavailable { id: ModelId },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Opaque per-call failure of a provider capability.
///
/// The orchestrator treats every variant identically: a stage-1 failure is
/// isolated to its identifier, a stage-2/3/4 failure is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    /// The provider is declared but has no implementation. Fails
    /// deterministically without attempting any network I/O.
    #[error("Provider '{id}' is not supported in this version")]
    NotSupported { id: ModelId },
}

/// Errors from the stage orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Every stage-1 identifier failed; downstream stages have nothing to review.
    #[error("No primary research succeeded; all primary models failed")]
    NoPrimaryResearchSucceeded,

    /// A single-call stage (review or synthesis) failed. Fatal.
    #[error("Critical stage {stage} failed for model '{id}': {source}")]
    CriticalStageFailed {
        stage: RunPhase,
        id: ModelId,
        #[source]
        source: ProviderError,
    },

    /// An artifact slot was written twice within one run. Programming error.
    #[error("Artifact slot '{name}' is already occupied")]
    ArtifactSlotOccupied { name: String },

    #[error("Expected artifact '{name}' is missing from the store")]
    MissingArtifact { name: String },
}

/// A type alias for results using the top-level [`ConclaveError`].
pub type Result<T> = std::result::Result<T, ConclaveError>;

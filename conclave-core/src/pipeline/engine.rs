//! The research pipeline engine.
//!
//! Owns the run loop: asks the registry for clients, composes each stage's
//! prompt from prior artifacts, invokes capabilities one at a time, and
//! persists results before advancing. Stage-1 failures are isolated per
//! identifier; stages 2-4 fail hard.

use crate::config::{ModelId, RunConfig};
use crate::error::{ConclaveError, ConfigError, PipelineError, ProviderError};
use crate::pipeline::artifacts::{ArtifactIndex, ArtifactKind, ArtifactStore};
use crate::pipeline::phase::RunPhase;
use crate::prompts::{
    self, PromptTemplates, SYSTEM_INTERPRETIVE, SYSTEM_PRIMARY, SYSTEM_STRUCTURAL,
    SYSTEM_SYNTHESIS,
};
use crate::registry::ClientRegistry;
use std::path::Path;
use tracing::{error, info, warn};

/// Per-invocation outcome during primary research. Transient: decides what
/// feeds the next stage and what the run report discloses.
struct StageOutcome {
    id: ModelId,
    result: Result<String, ProviderError>,
}

/// Result of a completed run: the full artifact index plus which stage-1
/// identifiers contributed, failed, or were skipped.
#[derive(Debug)]
pub struct RunReport {
    pub artifacts: ArtifactIndex,
    /// Identifiers whose primary research succeeded.
    pub contributed: Vec<ModelId>,
    /// Identifiers attempted at stage 1 whose call failed.
    pub failed: Vec<ModelId>,
    /// Identifiers omitted from the registry (disabled) and never attempted.
    pub skipped: Vec<ModelId>,
}

/// The four-stage deep-research pipeline.
///
/// Configuration and registry are constructed once, before any stage runs,
/// and are read-only for the rest of the run. The artifact index is the only
/// mutable state and only this engine writes to it.
pub struct ResearchPipeline {
    config: RunConfig,
    registry: ClientRegistry,
    templates: PromptTemplates,
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ResearchPipeline {
    /// Create a pipeline over a built registry.
    ///
    /// Fails fast if the chairman or either reviewer did not resolve to a
    /// client, so no single-call stage can discover a missing capability
    /// mid-run.
    pub fn new(
        config: RunConfig,
        registry: ClientRegistry,
        templates: PromptTemplates,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for id in [
            config.structural_reviewer,
            config.interpretive_reviewer,
            config.chairman_model,
        ] {
            if !registry.contains(id) {
                return Err(ConfigError::ReviewerUnavailable { id });
            }
        }
        Ok(Self {
            config,
            registry,
            templates,
        })
    }

    /// Run the pipeline end-to-end against one research specification.
    ///
    /// Artifacts are written under `out_dir` with stable names. Re-running
    /// against a non-empty output location is the caller's concern.
    pub async fn run(&self, spec_text: &str, out_dir: &Path) -> Result<RunReport, ConclaveError> {
        let store = ArtifactStore::create(out_dir)?;
        let mut index = ArtifactIndex::new();
        let mut phase = RunPhase::PrimaryResearch;

        // Stage 1: every primary model, failures isolated per identifier.
        let (contributed, failed, skipped) =
            self.run_primary_research(spec_text, &store, &mut index).await?;
        if contributed.is_empty() {
            error!("All primary models failed; nothing to review");
            return Err(PipelineError::NoPrimaryResearchSucceeded.into());
        }
        phase = phase.advance();

        let primary = self.collect_primary(&store, &contributed)?;

        // Stage 2: structural meta-review, fail-hard.
        let prompt = prompts::compose_structural(
            &self.templates.structural,
            spec_text,
            &primary,
            &failed,
        );
        let structural = self
            .run_critical_stage(phase, self.config.structural_reviewer, &prompt, SYSTEM_STRUCTURAL)
            .await?;
        let path = store.persist(ArtifactKind::StructuralReview, &structural)?;
        index.record(ArtifactKind::StructuralReview, path)?;
        phase = phase.advance();

        // Stage 3: interpretive meta-review, fail-hard.
        let structural = self.read_required(&store, &index, ArtifactKind::StructuralReview)?;
        let prompt = prompts::compose_interpretive(
            &self.templates.interpretive,
            spec_text,
            &primary,
            &structural,
        );
        let interpretive = self
            .run_critical_stage(
                phase,
                self.config.interpretive_reviewer,
                &prompt,
                SYSTEM_INTERPRETIVE,
            )
            .await?;
        let path = store.persist(ArtifactKind::InterpretiveReview, &interpretive)?;
        index.record(ArtifactKind::InterpretiveReview, path)?;
        phase = phase.advance();

        // Stage 4: chairman synthesis, fail-hard.
        let interpretive = self.read_required(&store, &index, ArtifactKind::InterpretiveReview)?;
        let prompt = prompts::compose_synthesis(
            &self.templates.synthesis,
            spec_text,
            &primary,
            &structural,
            &interpretive,
        );
        let report = self
            .run_critical_stage(phase, self.config.chairman_model, &prompt, SYSTEM_SYNTHESIS)
            .await?;
        let path = store.persist(ArtifactKind::FinalReport, &report)?;
        index.record(ArtifactKind::FinalReport, path)?;

        info!(
            contributed = contributed.len(),
            failed = failed.len(),
            skipped = skipped.len(),
            out_dir = %out_dir.display(),
            "Pipeline complete"
        );

        Ok(RunReport {
            artifacts: index,
            contributed,
            failed,
            skipped,
        })
    }

    /// Stage 1: attempt every primary model in order.
    ///
    /// The calls share no state beyond the read-only configuration and write
    /// to disjoint artifact slots, so they carry no ordering dependency on
    /// one another. Each result is persisted before the stage proceeds.
    async fn run_primary_research(
        &self,
        spec_text: &str,
        store: &ArtifactStore,
        index: &mut ArtifactIndex,
    ) -> Result<(Vec<ModelId>, Vec<ModelId>, Vec<ModelId>), ConclaveError> {
        let mut contributed = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();

        info!(models = self.config.primary_models.len(), "Starting primary research");

        for &id in &self.config.primary_models {
            let Some(client) = self.registry.get(id) else {
                info!(model = %id, "Model disabled; skipping primary research");
                skipped.push(id);
                continue;
            };

            let settings = self.config.model_settings(id);
            let prompt = prompts::compose_primary(
                &self.templates.primary,
                spec_text,
                settings.instruction.as_deref(),
            );

            let outcome = StageOutcome {
                id,
                result: client.run(&prompt, Some(SYSTEM_PRIMARY)).await,
            };

            match outcome.result {
                Ok(text) => {
                    let kind = ArtifactKind::PrimaryResearch(outcome.id);
                    let path = store.persist(kind, &text)?;
                    index.record(kind, path)?;
                    info!(model = %outcome.id, chars = text.len(), "Primary research complete");
                    contributed.push(outcome.id);
                }
                Err(e) => {
                    warn!(
                        model = %outcome.id,
                        error = %e,
                        "Primary research failed; excluding from review"
                    );
                    failed.push(outcome.id);
                }
            }
        }

        Ok((contributed, failed, skipped))
    }

    /// Read the surviving primary artifacts back as labeled text.
    fn collect_primary(
        &self,
        store: &ArtifactStore,
        contributed: &[ModelId],
    ) -> Result<Vec<(ModelId, String)>, ConclaveError> {
        contributed
            .iter()
            .map(|&id| {
                let text = store.read(ArtifactKind::PrimaryResearch(id))?;
                Ok((id, text))
            })
            .collect()
    }

    /// Read an artifact that must exist at this point in the run.
    fn read_required(
        &self,
        store: &ArtifactStore,
        index: &ArtifactIndex,
        kind: ArtifactKind,
    ) -> Result<String, ConclaveError> {
        if !index.contains(kind) {
            return Err(PipelineError::MissingArtifact {
                name: kind.to_string(),
            }
            .into());
        }
        Ok(store.read(kind)?)
    }

    /// Run a single-call stage against its designated identifier.
    ///
    /// Any provider failure here terminates the run; no later stage's
    /// capability is invoked.
    async fn run_critical_stage(
        &self,
        stage: RunPhase,
        id: ModelId,
        prompt: &str,
        system: &str,
    ) -> Result<String, ConclaveError> {
        let client = self
            .registry
            .get(id)
            .ok_or(ConfigError::ReviewerUnavailable { id })?;

        info!(stage = %stage, model = %id, "Running single-call stage");

        match client.run(prompt, Some(system)).await {
            Ok(text) => Ok(text),
            Err(source) => {
                error!(stage = %stage, model = %id, error = %source, "Critical stage failed");
                Err(PipelineError::CriticalStageFailed { stage, id, source }.into())
            }
        }
    }
}

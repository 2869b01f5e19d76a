//! Stage orchestration for the deep-research pipeline.
//!
//! Sequences the four stages over the client registry:
//! 1. **Primary research** — every primary model answers the specification
//!    independently; per-model failures are isolated.
//! 2. **Structural meta-review** — one designated model consolidates the
//!    surviving research; failure is fatal.
//! 3. **Interpretive meta-review** — a second designated model critiques
//!    everything so far; failure is fatal.
//! 4. **Final synthesis** — the chairman model produces the final report;
//!    failure is fatal.
//!
//! Each stage's output is persisted as a named artifact before the next
//! stage runs; artifact slots are write-once.

pub mod artifacts;
pub mod engine;
pub mod phase;

pub use artifacts::{ArtifactIndex, ArtifactKind, ArtifactRecord, ArtifactStore};
pub use engine::{ResearchPipeline, RunReport};
pub use phase::RunPhase;

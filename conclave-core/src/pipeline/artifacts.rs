//! Artifact persistence and the write-once artifact index.
//!
//! Every stage result is written to a file with a stable, identifier-keyed
//! name under the run's output directory, so a collaborator (e.g. the CLI)
//! can locate artifacts deterministically. The index grows monotonically
//! during a run; a slot is never rewritten once an entry lands.

use crate::config::ModelId;
use crate::error::PipelineError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A logical artifact slot, keyed by identifier or stage name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// One primary-research output per model.
    PrimaryResearch(ModelId),
    /// The structural (aggregative) meta-review.
    StructuralReview,
    /// The interpretive (critical) meta-review.
    InterpretiveReview,
    /// The chairman's final report.
    FinalReport,
}

impl ArtifactKind {
    /// Stable on-disk file name for this slot.
    pub fn file_name(&self) -> String {
        match self {
            ArtifactKind::PrimaryResearch(id) => format!("research_{id}.md"),
            ArtifactKind::StructuralReview => "meta_review_structural.md".to_string(),
            ArtifactKind::InterpretiveReview => "meta_review_interpretive.md".to_string(),
            ArtifactKind::FinalReport => "final_report.md".to_string(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::PrimaryResearch(id) => write!(f, "primary_research:{id}"),
            ArtifactKind::StructuralReview => f.write_str("structural_review"),
            ArtifactKind::InterpretiveReview => f.write_str("interpretive_review"),
            ArtifactKind::FinalReport => f.write_str("final_report"),
        }
    }
}

/// A persisted artifact: its slot and on-disk location.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Write-once mapping from artifact slot to persisted location.
///
/// Only the orchestrator writes to this, once per completed invocation.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    entries: BTreeMap<ArtifactKind, ArtifactRecord>,
}

impl ArtifactIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a persisted artifact.
    ///
    /// Recording into an occupied slot is a programming error and is
    /// rejected; an existing entry is never overwritten.
    pub fn record(&mut self, kind: ArtifactKind, path: PathBuf) -> Result<(), PipelineError> {
        if self.entries.contains_key(&kind) {
            return Err(PipelineError::ArtifactSlotOccupied {
                name: kind.to_string(),
            });
        }
        self.entries.insert(kind, ArtifactRecord { kind, path });
        Ok(())
    }

    /// The record for a slot, if written.
    pub fn get(&self, kind: ArtifactKind) -> Option<&ArtifactRecord> {
        self.entries.get(&kind)
    }

    /// Whether a slot has been written.
    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// All records, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.entries.values()
    }

    /// Number of written slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persists artifacts under a caller-supplied output directory and reads
/// them back as text for downstream prompt composition.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store's root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an artifact's text to its slot file and return the path.
    pub fn persist(&self, kind: ArtifactKind, text: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.join(kind.file_name());
        std::fs::write(&path, text)?;
        debug!(artifact = %kind, path = %path.display(), "Artifact persisted");
        Ok(path)
    }

    /// Read an artifact's text back from its slot file.
    pub fn read(&self, kind: ArtifactKind) -> std::io::Result<String> {
        std::fs::read_to_string(self.dir.join(kind.file_name()))
    }
}

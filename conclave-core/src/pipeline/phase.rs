//! Pipeline phase state machine.

use serde::{Deserialize, Serialize};

/// Current phase of a pipeline run.
///
/// Phases advance in strict order; `Failed` is reachable from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Querying every primary model independently.
    PrimaryResearch,
    /// Consolidating the surviving research (aggregative pass).
    StructuralReview,
    /// Critiquing research and structural review (critical pass).
    InterpretiveReview,
    /// Chairman synthesis of everything produced so far.
    FinalSynthesis,
    /// All artifacts persisted.
    Complete,
    /// Run terminated by a fatal error.
    Failed,
}

impl RunPhase {
    /// The next phase in strict order. Terminal phases stay put.
    pub fn advance(self) -> Self {
        match self {
            RunPhase::PrimaryResearch => RunPhase::StructuralReview,
            RunPhase::StructuralReview => RunPhase::InterpretiveReview,
            RunPhase::InterpretiveReview => RunPhase::FinalSynthesis,
            RunPhase::FinalSynthesis => RunPhase::Complete,
            RunPhase::Complete => RunPhase::Complete,
            RunPhase::Failed => RunPhase::Failed,
        }
    }

    /// Whether this phase ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Complete | RunPhase::Failed)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::PrimaryResearch => "primary_research",
            RunPhase::StructuralReview => "structural_review",
            RunPhase::InterpretiveReview => "interpretive_review",
            RunPhase::FinalSynthesis => "final_synthesis",
            RunPhase::Complete => "complete",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_advances_in_order() {
        let mut phase = RunPhase::PrimaryResearch;
        phase = phase.advance();
        assert_eq!(phase, RunPhase::StructuralReview);
        phase = phase.advance();
        assert_eq!(phase, RunPhase::InterpretiveReview);
        phase = phase.advance();
        assert_eq!(phase, RunPhase::FinalSynthesis);
        phase = phase.advance();
        assert_eq!(phase, RunPhase::Complete);
        // Terminal phases do not move.
        assert_eq!(phase.advance(), RunPhase::Complete);
        assert_eq!(RunPhase::Failed.advance(), RunPhase::Failed);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(RunPhase::Complete.is_terminal());
        assert!(RunPhase::Failed.is_terminal());
        assert!(!RunPhase::StructuralReview.is_terminal());
    }
}

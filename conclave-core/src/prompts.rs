//! Prompt composition for each pipeline stage.
//!
//! Four pure functions, one per stage. Each takes a fixed template plus the
//! artifacts produced by earlier stages and returns a single prompt string
//! with no side effects. Composition is deterministic, never mutates or
//! truncates its inputs, and succeeds on any subset of prior artifacts.

use crate::config::ModelId;

/// System instruction for primary-research calls.
pub const SYSTEM_PRIMARY: &str = "You are one of several independent research models. \
     Work only from the research specification you are given and answer in your own voice; \
     you cannot see the other models' output.";

/// System instruction for the structural meta-review call.
pub const SYSTEM_STRUCTURAL: &str = "You are a meta-reviewer consolidating research reports \
     from several independent models into a single organized review.";

/// System instruction for the interpretive meta-review call.
pub const SYSTEM_INTERPRETIVE: &str = "You are a critical meta-reviewer. Interrogate the \
     research reports and the structural review for conflicts, weak evidence, and gaps.";

/// System instruction for the final-synthesis call.
pub const SYSTEM_SYNTHESIS: &str = "You are the chairman of a research council, responsible \
     for synthesizing all prior research and reviews into one final report.";

/// The four stage templates, supplied by the caller as plain text.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub primary: String,
    pub structural: String,
    pub interpretive: String,
    pub synthesis: String,
}

/// Compose the primary-research prompt for one model.
///
/// Stage-1 prompts depend only on the template, the research specification,
/// and an optional provider-specific instruction fragment - never on other
/// providers' output.
pub fn compose_primary(template: &str, spec_text: &str, instruction: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str(template);
    if let Some(instruction) = instruction {
        prompt.push_str("\n\n");
        prompt.push_str(instruction);
    }
    push_spec_section(&mut prompt, spec_text);
    prompt
}

/// Compose the structural meta-review prompt.
///
/// Every successfully produced primary artifact is included, labeled by its
/// originating identifier. If any identifiers failed, an explicit note
/// enumerates them so the reviewer knows which providers did not contribute.
pub fn compose_structural(
    template: &str,
    spec_text: &str,
    primary: &[(ModelId, String)],
    missing: &[ModelId],
) -> String {
    let mut prompt = String::new();
    prompt.push_str(template);
    push_spec_section(&mut prompt, spec_text);
    push_primary_section(&mut prompt, primary);
    push_missing_note(&mut prompt, missing);
    prompt
}

/// Compose the interpretive meta-review prompt.
///
/// Consumes the same primary artifacts plus the structural review.
pub fn compose_interpretive(
    template: &str,
    spec_text: &str,
    primary: &[(ModelId, String)],
    structural: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(template);
    push_spec_section(&mut prompt, spec_text);
    push_primary_section(&mut prompt, primary);
    push_section(&mut prompt, "Structural Meta-Review", structural);
    prompt
}

/// Compose the final-synthesis prompt for the chairman model.
///
/// Consumes everything produced so far: all primary artifacts and both
/// meta-reviews.
pub fn compose_synthesis(
    template: &str,
    spec_text: &str,
    primary: &[(ModelId, String)],
    structural: &str,
    interpretive: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(template);
    push_spec_section(&mut prompt, spec_text);
    push_primary_section(&mut prompt, primary);
    push_section(&mut prompt, "Structural Meta-Review", structural);
    push_section(&mut prompt, "Interpretive Meta-Review", interpretive);
    prompt
}

fn push_section(prompt: &mut String, title: &str, body: &str) {
    prompt.push_str("\n\n# ");
    prompt.push_str(title);
    prompt.push_str("\n\n");
    prompt.push_str(body);
}

fn push_spec_section(prompt: &mut String, spec_text: &str) {
    push_section(prompt, "Research Specification", spec_text);
}

fn push_primary_section(prompt: &mut String, primary: &[(ModelId, String)]) {
    prompt.push_str("\n\n# Primary Research Contributions\n");
    for (id, text) in primary {
        prompt.push_str(&format!("\n--- research by {id} ---\n"));
        prompt.push_str(text);
        prompt.push('\n');
    }
}

fn push_missing_note(prompt: &mut String, missing: &[ModelId]) {
    if missing.is_empty() {
        return;
    }
    let names: Vec<&str> = missing.iter().map(|id| id.as_str()).collect();
    prompt.push_str(&format!(
        "\nNote: the following models failed to produce primary research and are \
         excluded from this review: {}.\n",
        names.join(", ")
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_primary() -> Vec<(ModelId, String)> {
        vec![
            (ModelId::Gpt, "gpt findings".to_string()),
            (ModelId::Claude, "claude findings".to_string()),
        ]
    }

    #[test]
    fn test_primary_includes_template_and_spec() {
        let prompt = compose_primary("Do the research.", "SPEC BODY", None);
        assert!(prompt.starts_with("Do the research."));
        assert!(prompt.contains("# Research Specification"));
        assert!(prompt.contains("SPEC BODY"));
    }

    #[test]
    fn test_primary_includes_instruction_fragment() {
        let prompt = compose_primary("Template.", "spec", Some("Cite sources inline."));
        assert!(prompt.contains("Cite sources inline."));
    }

    #[test]
    fn test_primary_is_deterministic() {
        let a = compose_primary("T", "S", Some("I"));
        let b = compose_primary("T", "S", Some("I"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_structural_labels_contributions() {
        let prompt = compose_structural("Review.", "spec", &sample_primary(), &[]);
        assert!(prompt.contains("--- research by gpt ---"));
        assert!(prompt.contains("gpt findings"));
        assert!(prompt.contains("--- research by claude ---"));
        assert!(prompt.contains("claude findings"));
        assert!(!prompt.contains("excluded from this review"));
    }

    #[test]
    fn test_structural_notes_missing_models() {
        let prompt = compose_structural(
            "Review.",
            "spec",
            &sample_primary(),
            &[ModelId::Gemini, ModelId::Grok],
        );
        assert!(prompt.contains("failed to produce primary research"));
        assert!(prompt.contains("gemini, grok"));
    }

    #[test]
    fn test_structural_succeeds_on_partial_artifacts() {
        // One surviving contribution is enough; composition never crashes on
        // a partial prior stage.
        let primary = vec![(ModelId::Claude, "only claude".to_string())];
        let prompt = compose_structural("Review.", "spec", &primary, &[ModelId::Gpt]);
        assert!(prompt.contains("only claude"));
        assert!(prompt.contains("gpt"));
    }

    #[test]
    fn test_interpretive_includes_structural_review() {
        let prompt =
            compose_interpretive("Critique.", "spec", &sample_primary(), "structural body");
        assert!(prompt.contains("# Structural Meta-Review"));
        assert!(prompt.contains("structural body"));
        assert!(!prompt.contains("# Interpretive Meta-Review"));
    }

    #[test]
    fn test_synthesis_includes_everything() {
        let prompt = compose_synthesis(
            "Synthesize.",
            "spec",
            &sample_primary(),
            "structural body",
            "interpretive body",
        );
        assert!(prompt.starts_with("Synthesize."));
        assert!(prompt.contains("gpt findings"));
        assert!(prompt.contains("structural body"));
        assert!(prompt.contains("# Interpretive Meta-Review"));
        assert!(prompt.contains("interpretive body"));
    }

    #[test]
    fn test_composition_does_not_mutate_inputs() {
        let primary = sample_primary();
        let before = primary.clone();
        let _ = compose_synthesis("T", "S", &primary, "st", "in");
        assert_eq!(primary.len(), before.len());
        assert_eq!(primary[0].1, before[0].1);
    }
}

//! Default prompt templates, embedded at compile time.
//!
//! Template content is data, not core logic: the core composes prompts from
//! whatever templates it is handed, and this module supplies the defaults.

use conclave_core::PromptTemplates;

const PRIMARY_RESEARCH: &str = include_str!("../templates/primary_research.md");
const STRUCTURAL_REVIEW: &str = include_str!("../templates/structural_review.md");
const INTERPRETIVE_REVIEW: &str = include_str!("../templates/interpretive_review.md");
const FINAL_SYNTHESIS: &str = include_str!("../templates/final_synthesis.md");

/// The built-in stage templates.
pub fn default_templates() -> PromptTemplates {
    PromptTemplates {
        primary: PRIMARY_RESEARCH.to_string(),
        structural: STRUCTURAL_REVIEW.to_string(),
        interpretive: INTERPRETIVE_REVIEW.to_string(),
        synthesis: FINAL_SYNTHESIS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_nonempty() {
        let templates = default_templates();
        assert!(!templates.primary.is_empty());
        assert!(!templates.structural.is_empty());
        assert!(!templates.interpretive.is_empty());
        assert!(!templates.synthesis.is_empty());
    }

    #[test]
    fn test_templates_match_their_stages() {
        let templates = default_templates();
        assert!(templates.primary.contains("independent deep research"));
        assert!(templates.structural.contains("structural meta-review"));
        assert!(templates.interpretive.contains("interpretive meta-review"));
        assert!(templates.synthesis.contains("chairman"));
    }
}

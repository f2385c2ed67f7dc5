//! Bundled default policy, compiled into the binary.

use crate::error::Result;

use super::{Policy, PolicyDocument};

const DEFAULT_POLICY_TOML: &str = include_str!("../../config/default-policy.toml");

/// The bundled default policy source text (TOML).
pub fn default_policy_source() -> &'static str {
    DEFAULT_POLICY_TOML
}

/// The bundled default policy as a document.
pub fn default_document() -> Result<PolicyDocument> {
    PolicyDocument::from_toml_str(DEFAULT_POLICY_TOML)
}

/// The bundled default policy, validated strictly.
pub fn default_policy() -> Result<Policy> {
    Ok(Policy::from_document(default_document()?, true)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_policy_is_valid() {
        let policy = default_policy().unwrap();
        assert_eq!(policy.persona_count(), 2);
        assert!(policy.dangling_references().is_empty());
    }

    #[test]
    fn test_bundled_rule_order() {
        let policy = default_policy().unwrap();
        let ids: Vec<&str> = policy.rules().iter().map(|r| r.persona_id()).collect();
        assert_eq!(ids, vec!["standard", "research"]);
    }

    #[test]
    fn test_bundled_personas() {
        let policy = default_policy().unwrap();
        let research = policy.persona("research").unwrap();
        assert_eq!(research.timezone, "Europe/Berlin");
        assert_eq!(research.screen.pixel_ratio(), 1.5);
        assert_eq!(research.languages(), vec!["en", "de"]);
    }
}

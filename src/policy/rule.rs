//! A single policy rule: a compiled pattern pointing at a persona id.

use super::pattern::{CompiledPattern, Pattern};

/// First-match-wins rule. The persona id is not checked here; a rule may
/// reference a persona the policy does not define.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pattern: CompiledPattern,
    persona_id: String,
}

impl Rule {
    pub fn new(pattern: Pattern, persona_id: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.compile()?,
            persona_id: persona_id.into(),
        })
    }

    pub fn pattern(&self) -> &Pattern {
        self.pattern.pattern()
    }

    pub fn compiled(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.pattern.matches(host)
    }
}

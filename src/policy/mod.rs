//! Policy model: the persona set and the ordered rule list that selects
//! among them.
//!
//! A [`Policy`] is immutable. Changing configuration means building a new
//! policy and handing it to the engine, which swaps it in wholesale.

pub mod bundled;
pub mod document;
pub mod pattern;
pub mod rule;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::PolicySettings;
use crate::error::{PolicyError, Result};
use crate::persona::Persona;

pub use document::{PatternSpec, PolicyDocument, RuleSpec};
pub use pattern::{CompiledPattern, Pattern};
pub use rule::Rule;

/// A rule whose persona id has no matching persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub rule_index: usize,
    pub persona_id: String,
}

/// Validated, ready-to-evaluate policy.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    personas: Vec<Arc<Persona>>,
    by_id: HashMap<String, usize>,
    rules: Vec<Rule>,
}

impl Policy {
    /// Build a policy. Persona ids must be unique; rules keep the given order
    /// and may reference unknown personas.
    pub fn new(personas: Vec<Persona>, rules: Vec<Rule>) -> std::result::Result<Self, PolicyError> {
        let mut by_id = HashMap::with_capacity(personas.len());
        let mut stored = Vec::with_capacity(personas.len());

        for persona in personas {
            if by_id.contains_key(&persona.id) {
                return Err(PolicyError::DuplicatePersona { id: persona.id });
            }
            by_id.insert(persona.id.clone(), stored.len());
            stored.push(Arc::new(persona));
        }

        Ok(Self {
            personas: stored,
            by_id,
            rules,
        })
    }

    /// Convert a document, compiling every pattern. With `strict` set, any
    /// dangling persona reference is rejected.
    pub fn from_document(
        document: PolicyDocument,
        strict: bool,
    ) -> std::result::Result<Self, PolicyError> {
        let mut rules = Vec::with_capacity(document.rules.len());
        for (index, spec) in document.rules.into_iter().enumerate() {
            let pattern = spec
                .pattern
                .into_pattern()
                .map_err(|reason| PolicyError::MalformedPattern { index, reason })?;
            let rule = Rule::new(pattern, spec.persona_id).map_err(|e| {
                PolicyError::MalformedPattern {
                    index,
                    reason: e.to_string(),
                }
            })?;
            rules.push(rule);
        }

        let policy = Self::new(document.personas, rules)?;

        if strict {
            if let Some(dangling) = policy.dangling_references().into_iter().next() {
                return Err(PolicyError::UnknownPersona {
                    index: dangling.rule_index,
                    persona_id: dangling.persona_id,
                });
            }
        }

        debug!(
            personas = policy.personas.len(),
            rules = policy.rules.len(),
            strict,
            "Policy built from document"
        );
        Ok(policy)
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Personas in declaration order.
    pub fn personas(&self) -> impl Iterator<Item = &Arc<Persona>> {
        self.personas.iter()
    }

    pub fn persona(&self, id: &str) -> Option<&Arc<Persona>> {
        self.by_id.get(id).map(|&i| &self.personas[i])
    }

    pub fn persona_count(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule that points at a persona this policy does not define.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| !self.by_id.contains_key(rule.persona_id()))
            .map(|(rule_index, rule)| DanglingReference {
                rule_index,
                persona_id: rule.persona_id().to_string(),
            })
            .collect()
    }

    /// Warn once per dangling rule. Returns how many there were.
    pub fn log_dangling_references(&self) -> usize {
        let dangling = self.dangling_references();
        for d in &dangling {
            warn!(
                rule = d.rule_index,
                persona_id = %d.persona_id,
                "Rule references unknown persona; it will never resolve"
            );
        }
        dangling.len()
    }

    /// Snapshot back into document form.
    pub fn to_document(&self) -> PolicyDocument {
        PolicyDocument {
            personas: self.personas.iter().map(|p| Persona::clone(p)).collect(),
            rules: self
                .rules
                .iter()
                .map(|r| RuleSpec::new(r.pattern().clone(), r.persona_id()))
                .collect(),
        }
    }
}

impl TryFrom<PolicyDocument> for Policy {
    type Error = PolicyError;

    fn try_from(document: PolicyDocument) -> std::result::Result<Self, Self::Error> {
        Policy::from_document(document, false)
    }
}

/// Load the policy named by the settings, falling back to the bundled
/// default when no path is configured.
pub fn load_policy(settings: &PolicySettings) -> Result<Policy> {
    let document = match settings.path.as_deref() {
        Some(path) => {
            debug!(path = %path, "Loading policy document");
            PolicyDocument::from_path(path)?
        }
        None => bundled::default_document()?,
    };
    Ok(Policy::from_document(document, settings.strict_references)?)
}

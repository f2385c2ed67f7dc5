//! Persona engine: the active policy, the resolution cache, and the
//! first-match resolver, behind one handle.
//!
//! Policy and cache share a single lock so that replacing the policy and
//! clearing the cache is one step for every concurrent caller. Rule scans run
//! against an `Arc` snapshot outside the write lock; a scan result is only
//! cached if the policy generation it was computed under is still current.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::FirewallConfig;
use crate::error::PolicyError;
use crate::persona::Persona;
use crate::policy::{pattern::lowercase, Policy};

use super::audit::ResolutionRecord;
use super::cache::ResolutionCache;
use super::matcher::{HostMatcher, PatternMatcher};

/// Engine behavior switches.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Reject policies with dangling persona references.
    pub strict_references: bool,
    /// Emit a [`ResolutionRecord`] per successful resolution.
    pub audit: bool,
    /// Resolution cache bound (0 = unbounded).
    pub max_cache_entries: usize,
}

impl EngineOptions {
    pub fn from_config(config: &FirewallConfig) -> Self {
        Self {
            strict_references: config.policy.strict_references,
            audit: config.resolver.audit,
            max_cache_entries: config.resolver.max_cache_entries,
        }
    }
}

struct EngineState {
    policy: Arc<Policy>,
    cache: ResolutionCache,
    generation: u64,
}

/// Resolves hostnames to personas under a replaceable policy.
pub struct PersonaEngine<M: HostMatcher = PatternMatcher> {
    state: RwLock<EngineState>,
    matcher: M,
    options: EngineOptions,
}

impl PersonaEngine<PatternMatcher> {
    /// Engine with default options. The initial policy is trusted as given.
    pub fn new(policy: Policy) -> Self {
        Self::with_options(policy, EngineOptions::default())
    }

    pub fn with_options(policy: Policy, options: EngineOptions) -> Self {
        Self::with_matcher(policy, options, PatternMatcher)
    }
}

impl<M: HostMatcher> PersonaEngine<M> {
    pub fn with_matcher(policy: Policy, options: EngineOptions, matcher: M) -> Self {
        let cache = ResolutionCache::new(options.max_cache_entries);
        Self {
            state: RwLock::new(EngineState {
                policy: Arc::new(policy),
                cache,
                generation: 0,
            }),
            matcher,
            options,
        }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ─────────────────────────────────────────────────────────────
    // Policy Store
    // ─────────────────────────────────────────────────────────────

    /// Replace the active policy and clear the resolution cache in one step.
    ///
    /// Dangling persona references are logged, or rejected when
    /// `strict_references` is set (the active policy is then left untouched).
    pub fn set_policy(&self, policy: Policy) -> Result<(), PolicyError> {
        if self.options.strict_references {
            if let Some(first) = policy.dangling_references().into_iter().next() {
                return Err(PolicyError::UnknownPersona {
                    index: first.rule_index,
                    persona_id: first.persona_id,
                });
            }
        } else {
            policy.log_dangling_references();
        }

        let rules = policy.rules().len();
        let personas = policy.persona_count();

        let mut state = self.state.write();
        state.policy = Arc::new(policy);
        state.generation += 1;
        let evicted = state.cache.clear();
        let generation = state.generation;
        drop(state);

        info!(rules, personas, evicted, generation, "Policy replaced");
        Ok(())
    }

    /// Read-only snapshot of the active policy.
    pub fn get_policy(&self) -> Arc<Policy> {
        Arc::clone(&self.state.read().policy)
    }

    /// Number of memoized resolutions.
    pub fn cache_len(&self) -> usize {
        self.state.read().cache.len()
    }

    // ─────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────

    /// Resolve a hostname to a persona.
    ///
    /// The host is opaque (no URL parsing) and compared case-insensitively.
    /// A cached answer is returned without evaluating any rule. On a miss
    /// the first rule that matches and names an existing persona wins; rules
    /// that match but dangle are skipped. Only positive answers are cached.
    pub fn resolve(&self, host: &str) -> Option<Arc<Persona>> {
        let key = lowercase(host).into_owned();

        let (policy, generation) = {
            let state = self.state.read();
            if let Some(persona) = state.cache.get(&key) {
                debug!(host = %key, persona_id = %persona.id, "Cache hit");
                self.audit(&key, &persona, true);
                return Some(persona);
            }
            (Arc::clone(&state.policy), state.generation)
        };

        let persona = self.scan(&policy, &key);

        match persona {
            Some(ref persona) => {
                let mut state = self.state.write();
                if state.generation == generation {
                    state.cache.insert(key.clone(), Arc::clone(persona));
                } else {
                    debug!(host = %key, "Policy replaced during scan; result not cached");
                }
                drop(state);
                self.audit(&key, persona, false);
            }
            None => debug!(host = %key, rules = policy.rules().len(), "No persona"),
        }

        persona
    }

    fn scan(&self, policy: &Policy, host: &str) -> Option<Arc<Persona>> {
        for (index, rule) in policy.rules().iter().enumerate() {
            if !self.matcher.matches(host, rule.compiled()) {
                continue;
            }
            match policy.persona(rule.persona_id()) {
                Some(persona) => {
                    debug!(
                        host = %host,
                        rule = index,
                        pattern = %rule.pattern(),
                        persona_id = %persona.id,
                        "Rule matched"
                    );
                    return Some(Arc::clone(persona));
                }
                None => debug!(
                    host = %host,
                    rule = index,
                    persona_id = %rule.persona_id(),
                    "Rule matched but persona is missing; continuing"
                ),
            }
        }
        None
    }

    fn audit(&self, host: &str, persona: &Persona, cached: bool) {
        if self.options.audit {
            ResolutionRecord::new(host, persona.id.as_str(), cached).emit();
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

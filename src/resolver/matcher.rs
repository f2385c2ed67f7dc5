//! Matcher seam between the resolver and pattern evaluation.

use crate::policy::CompiledPattern;

/// Decides whether a hostname satisfies a pattern.
///
/// Implementations must be case-insensitive and side-effect free as far as
/// resolution is concerned. The engine is generic over this trait so tests
/// can observe how many evaluations a resolution performed.
pub trait HostMatcher: Send + Sync {
    fn matches(&self, host: &str, pattern: &CompiledPattern) -> bool;
}

/// Default matcher: delegates to the compiled pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl HostMatcher for PatternMatcher {
    fn matches(&self, host: &str, pattern: &CompiledPattern) -> bool {
        pattern.matches(host)
    }
}

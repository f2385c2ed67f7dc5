//! Hostname → persona resolution with memoization.

pub mod audit;
pub mod cache;
pub mod engine;
pub mod host;
pub mod matcher;

pub use audit::{ResolutionRecord, AUDIT_TARGET};
pub use cache::ResolutionCache;
pub use engine::{EngineOptions, PersonaEngine};
pub use host::host_from_input;
pub use matcher::{HostMatcher, PatternMatcher};

//! Resolution audit records.
//!
//! When auditing is enabled every successful resolution is emitted as a
//! structured event on [`AUDIT_TARGET`], so it ends up wherever the tracing
//! subscriber sends logs (console, JSON, rotating file).

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Tracing target for audit events; filter on it with `RUST_LOG`.
pub const AUDIT_TARGET: &str = "identity_firewall::audit";

/// One successful resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionRecord {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub persona_id: String,
    /// Served from the resolution cache.
    pub cached: bool,
}

impl ResolutionRecord {
    pub fn new(host: impl Into<String>, persona_id: impl Into<String>, cached: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            host: host.into(),
            persona_id: persona_id.into(),
            cached,
        }
    }

    pub fn emit(&self) {
        info!(
            target: AUDIT_TARGET,
            timestamp = %self.timestamp.to_rfc3339(),
            host = %self.host,
            persona_id = %self.persona_id,
            cached = self.cached,
            "Persona resolved"
        );
    }
}

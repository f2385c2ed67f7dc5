//! Protocol message definitions
//!
//! Request/response messages exchanged with the content-script and popup
//! side. Messages are JSON objects with a `type` discriminator.

use serde::{Deserialize, Serialize};

use crate::persona::Persona;
use crate::policy::PolicyDocument;

// ─────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────

/// Messages accepted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Resolve the persona for a hostname.
    ResolvePersona { host: String },

    /// Fetch the active policy document.
    GetConfig,

    /// Replace the active policy (clears the resolution cache).
    SetConfig { config: PolicyDocument },
}

impl Request {
    /// Get the message type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Request::ResolvePersona { .. } => "resolve_persona",
            Request::GetConfig => "get_config",
            Request::SetConfig { .. } => "set_config",
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────

/// Messages produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Answer to `resolve_persona`; `persona` is absent when nothing matched.
    PersonaResolved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        persona: Option<Persona>,
    },

    /// Answer to `get_config`.
    ConfigRetrieved { config: PolicyDocument },

    /// Answer to `set_config`.
    ConfigSet {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The request could not be decoded.
    Error { error: String },
}

impl Response {
    /// Get the message type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Response::PersonaResolved { .. } => "persona_resolved",
            Response::ConfigRetrieved { .. } => "config_retrieved",
            Response::ConfigSet { .. } => "config_set",
            Response::Error { .. } => "error",
        }
    }
}

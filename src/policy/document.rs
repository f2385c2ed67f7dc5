//! Policy documents as exchanged with the configuration store.
//!
//! The document is the wire/disk shape of a policy. Patterns are read into a
//! four-slot [`PatternSpec`] so that a rule naming zero or several matcher
//! kinds reaches validation (and is reported with its rule index) instead of
//! failing deep inside the deserializer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persona::Persona;

use super::pattern::Pattern;

/// Serialized policy: personas plus the ordered rule list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub personas: Vec<Persona>,

    /// Evaluation order is the order written here.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule as written in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: PatternSpec,
    pub persona_id: String,
}

impl RuleSpec {
    pub fn new(pattern: Pattern, persona_id: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            persona_id: persona_id.into(),
        }
    }
}

/// Unvalidated pattern object: `{ "Exact" | "Prefix" | "Suffix" | "Glob": text }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    #[serde(rename = "Exact", default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,

    #[serde(rename = "Prefix", default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(rename = "Suffix", default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(rename = "Glob", default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,

    /// Keys that name no matcher kind. Kept only so they can be rejected.
    #[serde(flatten, default, skip_serializing)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl PatternSpec {
    /// Collapse into a [`Pattern`], requiring exactly one populated kind.
    pub fn into_pattern(self) -> std::result::Result<Pattern, String> {
        if !self.unknown.is_empty() {
            let keys: Vec<&str> = self.unknown.keys().map(String::as_str).collect();
            return Err(format!(
                "unknown matcher kind {} (expected one of Exact, Prefix, Suffix, Glob)",
                keys.join(", ")
            ));
        }

        let mut kinds = [
            self.exact.map(Pattern::Exact),
            self.prefix.map(Pattern::Prefix),
            self.suffix.map(Pattern::Suffix),
            self.glob.map(Pattern::Glob),
        ]
        .into_iter()
        .flatten();

        match (kinds.next(), kinds.next()) {
            (Some(pattern), None) => Ok(pattern),
            (None, _) => Err("no matcher kind set (expected one of Exact, Prefix, Suffix, Glob)".into()),
            (Some(first), Some(second)) => Err(format!(
                "more than one matcher kind set ({} and {})",
                first.kind(),
                second.kind()
            )),
        }
    }
}

impl From<Pattern> for PatternSpec {
    fn from(pattern: Pattern) -> Self {
        let mut spec = PatternSpec::default();
        match pattern {
            Pattern::Exact(s) => spec.exact = Some(s),
            Pattern::Prefix(s) => spec.prefix = Some(s),
            Pattern::Suffix(s) => spec.suffix = Some(s),
            Pattern::Glob(s) => spec.glob = Some(s),
        }
        spec
    }
}

// ─────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────

impl PolicyDocument {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::policy_parse(format!("invalid TOML: {}", e)))
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| Error::policy_parse(format!("invalid JSON: {}", e)))
    }

    /// Read a document; `.json` files are JSON, anything else TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if is_json_path(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write in the format implied by the file extension.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json_path(path) {
            self.to_json_pretty()?
        } else {
            self.to_toml_string()?
        };
        fs::write(path, content).map_err(|e| Error::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

//! Error types for the identity firewall
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! Policy validation failures have their own [`PolicyError`] so the
//! configuration-store side can match on them without pulling in IO or
//! protocol variants.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for firewall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Policy errors (3xx)
    PolicyParse = 300,
    MalformedPattern = 301,
    DuplicatePersona = 302,
    UnknownPersona = 303,

    // Protocol errors (4xx)
    ProtocolMalformed = 400,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A policy document that cannot become an active policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A rule pattern carries zero or several matcher kinds, or its glob
    /// text cannot be compiled.
    #[error("Rule {index} has a malformed pattern: {reason}")]
    MalformedPattern { index: usize, reason: String },

    /// Two personas share the same id.
    #[error("Duplicate persona id: {id}")]
    DuplicatePersona { id: String },

    /// A rule references a persona id absent from the policy (strict mode only).
    #[error("Rule {index} references unknown persona: {persona_id}")]
    UnknownPersona { index: usize, persona_id: String },
}

impl PolicyError {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            PolicyError::MalformedPattern { .. } => ErrorCode::MalformedPattern,
            PolicyError::DuplicatePersona { .. } => ErrorCode::DuplicatePersona,
            PolicyError::UnknownPersona { .. } => ErrorCode::UnknownPersona,
        }
    }
}

/// Main error type for the firewall
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Policy Errors
    // ─────────────────────────────────────────────────────────────

    /// Policy document could not be decoded
    #[error("Failed to parse policy document: {message}")]
    PolicyParse { message: String },

    /// Policy document decoded but failed validation
    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),

    // ─────────────────────────────────────────────────────────────
    // Protocol Errors
    // ─────────────────────────────────────────────────────────────

    /// Malformed transport message
    #[error("Malformed protocol message: {message}")]
    ProtocolMalformed { message: String },

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::PolicyParse { .. } => ErrorCode::PolicyParse,
            Error::Policy(e) => e.code(),

            Error::ProtocolMalformed { .. } => ErrorCode::ProtocolMalformed,
            Error::Json(_) => ErrorCode::ProtocolMalformed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'identity-firewall config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'identity-firewall config validate' to see details.",
            ),
            Error::ConfigValidation { .. } => {
                Some("Review the configuration file and fix the invalid values.")
            }
            Error::PolicyParse { .. } => Some(
                "Policy documents are JSON (.json) or TOML (any other extension). Run 'identity-firewall policy init' for a template.",
            ),
            Error::Policy(PolicyError::MalformedPattern { .. }) => Some(
                "Each rule pattern must set exactly one of Exact, Prefix, Suffix or Glob.",
            ),
            Error::Policy(PolicyError::DuplicatePersona { .. }) => {
                Some("Persona ids must be unique within a policy.")
            }
            Error::Policy(PolicyError::UnknownPersona { .. }) => Some(
                "Add the missing persona or disable 'strict_references' to skip dangling rules.",
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a policy parse error
    pub fn policy_parse(message: impl Into<String>) -> Self {
        Error::PolicyParse {
            message: message.into(),
        }
    }

    /// Create a protocol malformed error
    pub fn protocol_malformed(message: impl Into<String>) -> Self {
        Error::ProtocolMalformed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::MalformedPattern.as_str(), "E301");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::DuplicatePersona.exit_code(), 30);
        assert_eq!(ErrorCode::ProtocolMalformed.exit_code(), 40);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_policy_error_codes() {
        let err: Error = PolicyError::MalformedPattern {
            index: 2,
            reason: "no matcher kind set".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::MalformedPattern);
        assert!(err.to_string().contains("Rule 2"));

        let err: Error = PolicyError::DuplicatePersona { id: "p1".into() }.into();
        assert_eq!(err.code(), ErrorCode::DuplicatePersona);
        assert_eq!(err.exit_code(), 30);
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().unwrap().contains("config init"));

        let err: Error = PolicyError::UnknownPersona {
            index: 0,
            persona_id: "ghost".into(),
        }
        .into();
        assert!(err.suggestion().unwrap().contains("strict_references"));

        assert!(Error::Internal("boom".into()).suggestion().is_none());
    }

    #[test]
    fn test_format_for_terminal() {
        let formatted = Error::config_not_found("/test/config.toml").format_for_terminal();
        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let formatted = Error::policy_parse("bad json").format_for_log();
        assert!(formatted.contains("[E300]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}

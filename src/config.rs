//! Configuration system for the identity firewall
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (IDFW_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Where the active policy comes from
    pub policy: PolicySettings,

    /// Resolver behavior
    pub resolver: ResolverSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Policy source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Policy document path (.json or .toml); bundled default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Reject rules that reference undefined personas instead of skipping them
    pub strict_references: bool,
}

/// Resolver settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Emit an audit event for every successful resolution
    pub audit: bool,

    /// Maximum memoized resolutions (0 = unbounded)
    pub max_cache_entries: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl FirewallConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("identity-firewall.toml"),
            dirs::config_dir()
                .map(|p| p.join("identity-firewall").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".identity-firewall").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/identity-firewall/config.toml"),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("IDFW_POLICY_PATH") {
            self.policy.path = Some(val);
        }
        if let Ok(val) = std::env::var("IDFW_STRICT_REFERENCES") {
            self.policy.strict_references = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("IDFW_AUDIT") {
            self.resolver.audit = parse_bool(&val);
        }
        if let Ok(val) = std::env::var("IDFW_MAX_CACHE_ENTRIES") {
            if let Ok(n) = val.parse() {
                self.resolver.max_cache_entries = n;
            }
        }

        if let Ok(val) = std::env::var("IDFW_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("IDFW_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("IDFW_LOG_JSON") {
            self.logging.json_format = parse_bool(&val);
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref path) = self.policy.path {
            self.policy.path = Some(expand_path(path));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.policy.path {
            if path.trim().is_empty() {
                return Err(Error::config_field_invalid(
                    "policy.path",
                    "Policy path cannot be empty (omit it to use the bundled policy)",
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        if self.logging.file.is_some() && self.logging.max_files == 0 {
            return Err(Error::config_field_invalid(
                "logging.max_files",
                "max_files must be at least 1 when file logging is enabled",
            ));
        }

        Ok(())
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".identity-firewall")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Identity Firewall Configuration

[policy]
# Policy document (.json or .toml). Comment out to use the bundled default.
# path = "~/.identity-firewall/policy.toml"

# Reject rules that reference undefined personas (default: skip them)
strict_references = false

[resolver]
# Emit an audit log event for every successful resolution
audit = false

# Maximum memoized resolutions (0 = unbounded)
max_cache_entries = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.identity-firewall/logs/firewall.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FirewallConfig::default();
        assert!(config.policy.path.is_none());
        assert!(!config.policy.strict_references);
        assert_eq!(config.resolver.max_cache_entries, 0);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("IDFW_STRICT_REFERENCES", "true");
        env::set_var("IDFW_MAX_CACHE_ENTRIES", "256");
        env::set_var("IDFW_LOG_LEVEL", "debug");

        let mut config = FirewallConfig::default();
        config.apply_env_overrides();

        assert!(config.policy.strict_references);
        assert_eq!(config.resolver.max_cache_entries, 256);
        assert_eq!(config.logging.level, "debug");

        env::remove_var("IDFW_STRICT_REFERENCES");
        env::remove_var("IDFW_MAX_CACHE_ENTRIES");
        env::remove_var("IDFW_LOG_LEVEL");
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = FirewallConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_policy_path() {
        let mut config = FirewallConfig::default();
        config.policy.path = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = FirewallConfig::default();
        config.policy.path = Some("~/policy.toml".to_string());
        config.expand_paths();
        assert!(!config.policy.path.unwrap().contains('~'));
    }

    #[test]
    fn test_parse_config_file() {
        let config: FirewallConfig = toml::from_str(
            r#"
[policy]
path = "/etc/identity-firewall/policy.json"
strict_references = true

[resolver]
audit = true

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(
            config.policy.path.as_deref(),
            Some("/etc/identity-firewall/policy.json")
        );
        assert!(config.policy.strict_references);
        assert!(config.resolver.audit);
        assert_eq!(config.resolver.max_cache_entries, 0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = FirewallConfig::load(Some("/no/such/identity-firewall.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_init_config_writes_loadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let written = init_config(path.to_str(), false).unwrap();
        assert_eq!(written, path);

        let parsed: FirewallConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.validate().is_ok());

        assert!(init_config(path.to_str(), false).is_err());
        assert!(init_config(path.to_str(), true).is_ok());
    }
}

//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides
//! through the binary.

mod common;

use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use tempfile::TempDir;

use common::firewall_cmd;

/// Test fixture for configuration testing
struct ConfigFixture {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Self {
            temp_dir,
            config_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

const SINGLE_RULE_POLICY: &str = r#"
[[personas]]
id = "quiet"
user_agent = "Mozilla/5.0"
accept_language = "sv-SE"
timezone = "Europe/Stockholm"
screen = { width = 1280, height = 720, color_depth = 24 }

[[rules]]
pattern = { Prefix = "intranet." }
persona_id = "quiet"
"#;

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config("");

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .success();
}

#[test]
fn test_full_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[policy]
path = "/etc/identity-firewall/policy.toml"
strict_references = true

[resolver]
audit = true
max_cache_entries = 512

[logging]
level = "debug"
file = "/tmp/identity-firewall/firewall.log"
max_file_size_mb = 5
max_files = 3
json_format = true
"#,
    );

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[logging]\nlevel = \"invalid_level\"\n");

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .failure();
}

#[test]
fn test_empty_policy_path() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[policy]\npath = \"\"\n");

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Policy path cannot be empty"));
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[policy\nstrict_references = true\n");

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("E101"));
}

#[test]
fn test_wrong_value_type() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[resolver]\nmax_cache_entries = \"lots\"\n");

    firewall_cmd()
        .args(["config", "validate", "--config", fixture.path()])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────
// Config Show / Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_custom() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[policy]
path = "/srv/policies/team.json"

[resolver]
max_cache_entries = 4096
"#,
    );

    firewall_cmd()
        .args(["config", "show", "--config", fixture.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/policies/team.json"))
        .stdout(predicate::str::contains("4096"));
}

#[test]
fn test_env_overrides_file() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[resolver]\nmax_cache_entries = 10\n");

    firewall_cmd()
        .env("IDFW_MAX_CACHE_ENTRIES", "77")
        .env("IDFW_AUDIT", "1")
        .args(["config", "show", "--config", fixture.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_cache_entries = 77"))
        .stdout(predicate::str::contains("audit = true"));
}

#[test]
fn test_config_policy_path_used_by_resolve() {
    let fixture = ConfigFixture::new();
    let policy = fixture.write_file("policy.toml", SINGLE_RULE_POLICY);
    fixture.write_config(&format!("[policy]\npath = {:?}\n", policy.to_str().unwrap()));

    firewall_cmd()
        .args(["resolve", "--config", fixture.path(), "intranet.corp", "www.amazon.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intranet.corp -> quiet"))
        .stdout(predicate::str::contains("www.amazon.com -> (none)"));
}

#[test]
fn test_policy_env_var() {
    let fixture = ConfigFixture::new();
    let policy = fixture.write_file("policy.toml", SINGLE_RULE_POLICY);
    fixture.write_config("");

    firewall_cmd()
        .env("IDFW_POLICY_PATH", &policy)
        .args(["resolve", "--config", fixture.path(), "INTRANET.example"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INTRANET.example -> quiet"));
}

#[test]
fn test_audit_events_on_stderr() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[resolver]\naudit = true\n\n[logging]\nlevel = \"info\"\n");

    firewall_cmd()
        .args(["resolve", "--config", fixture.path(), "www.amazon.com"])
        .assert()
        .success()
        .stderr(predicate::str::contains("identity_firewall::audit"));
}

// ─────────────────────────────────────────────────────────────────
// Config Init Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("new_config.toml");

    firewall_cmd()
        .args(["config", "init", "--path", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    assert!(config_path.exists());

    firewall_cmd()
        .args(["config", "validate", "--config", config_path.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[policy]\n");

    firewall_cmd()
        .args(["config", "init", "--path", fixture.path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    firewall_cmd()
        .args(["config", "init", "--force", "--path", fixture.path()])
        .assert()
        .success();
}

//! Common test utilities and fixtures

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn fixture_str(name: &str) -> String {
    fixture_path(name).to_string_lossy().into_owned()
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Policy with an exact, a glob and a suffix rule (JSON)
pub fn policy_fixture() -> PathBuf {
    fixture_path("policy.json")
}

/// Policy whose first rule names a persona that does not exist (TOML)
pub fn dangling_policy_fixture() -> PathBuf {
    fixture_path("dangling_policy.toml")
}

/// Policy whose only rule sets two matcher kinds
pub fn malformed_policy_fixture() -> PathBuf {
    fixture_path("malformed_policy.json")
}

/// The binary under test, isolated from any IDFW_* variables in the
/// environment running the tests.
pub fn firewall_cmd() -> Command {
    let mut cmd = Command::cargo_bin("identity-firewall").unwrap();
    for var in [
        "IDFW_CONFIG",
        "IDFW_POLICY_PATH",
        "IDFW_STRICT_REFERENCES",
        "IDFW_AUDIT",
        "IDFW_MAX_CACHE_ENTRIES",
        "IDFW_LOG_LEVEL",
        "IDFW_LOG_FILE",
        "IDFW_LOG_JSON",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

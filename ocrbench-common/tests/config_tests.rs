//! Unit tests for settings resolution and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not fail startup (defaults are used)
//! - Priority order CLI → ENV → TOML → default
//! - Invalid TOML and invalid environment values are configuration errors
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that touch OCRBENCH_* variables are marked #[serial].

use ocrbench_common::config::{
    load_toml_config, ConfigOverrides, DashboardSettings, TomlConfig, DEFAULT_CATEGORY,
    DEFAULT_DATA_URL, ENV_DATA_URL, ENV_TIMEOUT_MS,
};
use ocrbench_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;

fn clear_env() {
    env::remove_var(ENV_DATA_URL);
    env::remove_var(ENV_TIMEOUT_MS);
}

fn write_toml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write toml");
    file
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();

    let settings = DashboardSettings::resolve(&ConfigOverrides::default(), None).unwrap();

    assert_eq!(settings.data_url, DEFAULT_DATA_URL);
    assert_eq!(settings.timeout, Duration::from_millis(5000));
    assert_eq!(settings.manifest_file, "manifest.json");
    assert_eq!(settings.model_links_file, "model_links.json");
    assert_eq!(settings.default_category, DEFAULT_CATEGORY);
    assert_eq!(settings.log_level, "info");
}

#[test]
fn test_missing_toml_file_is_not_an_error() {
    let path = std::path::PathBuf::from("/tmp/ocrbench-test-does-not-exist/config.toml");
    let loaded = load_toml_config(&path).unwrap();
    assert!(loaded.is_none());
}

#[test]
#[serial]
fn test_toml_values_are_used() {
    clear_env();
    let file = write_toml(
        r#"
data_url = "https://bench.example.org/data/json"
timeout_ms = 1200
manifest_file = "index.json"
default_category = "Misc"

[logging]
level = "debug"
"#,
    );

    let settings = DashboardSettings::load(Some(file.path()), &ConfigOverrides::default()).unwrap();

    assert_eq!(settings.data_url, "https://bench.example.org/data/json/");
    assert_eq!(settings.timeout, Duration::from_millis(1200));
    assert_eq!(settings.manifest_file, "index.json");
    assert_eq!(settings.model_links_file, "model_links.json");
    assert_eq!(settings.default_category, "Misc");
    assert_eq!(settings.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_DATA_URL, "http://env.example/data/");
    env::set_var(ENV_TIMEOUT_MS, "900");

    let toml_config = TomlConfig {
        data_url: Some("http://toml.example/data/".to_string()),
        timeout_ms: Some(100),
        ..Default::default()
    };
    let settings =
        DashboardSettings::resolve(&ConfigOverrides::default(), Some(&toml_config)).unwrap();

    assert_eq!(settings.data_url, "http://env.example/data/");
    assert_eq!(settings.timeout, Duration::from_millis(900));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_DATA_URL, "http://env.example/data/");
    env::set_var(ENV_TIMEOUT_MS, "900");

    let overrides = ConfigOverrides {
        data_url: Some("http://cli.example/data".to_string()),
        timeout_ms: Some(50),
    };
    let settings = DashboardSettings::resolve(&overrides, None).unwrap();

    assert_eq!(settings.data_url, "http://cli.example/data/");
    assert_eq!(settings.timeout, Duration::from_millis(50));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_timeout_is_config_error() {
    clear_env();
    env::set_var(ENV_TIMEOUT_MS, "soon");

    let result = DashboardSettings::resolve(&ConfigOverrides::default(), None);
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    clear_env();
    let overrides = ConfigOverrides {
        data_url: None,
        timeout_ms: Some(0),
    };
    let result = DashboardSettings::resolve(&overrides, None);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_unparsable_toml_is_config_error() {
    let file = write_toml("timeout_ms = \"not a number\"\n");
    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading.

use keyvault_config::diagnostic::ConfigError;
use keyvault_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[log]
level = "debug"

[storage]
database_path = "/tmp/keyvault-test.db"
wal_mode = false

[vault]
master_kdf_iterations = 600000
pin_kdf_iterations = 6000
session_dir = "/tmp/keyvault-session"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/keyvault-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.vault.master_kdf_iterations, 600_000);
    assert_eq!(config.vault.pin_kdf_iterations, 6_000);
    assert_eq!(
        config.vault.session_dir.as_deref(),
        Some("/tmp/keyvault-session")
    );
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.log.level, "info");
    assert!(config.storage.wal_mode);
    assert_eq!(config.vault.master_kdf_iterations, 1_000_000);
}

#[test]
fn typo_produces_unknown_key_with_suggestion() {
    let errors = load_and_validate_str("[vault]\nmaster_kdf_iteration = 5\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion: Some(s), .. }
            if key == "master_kdf_iteration" && s == "master_kdf_iterations"
    )));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let errors = load_and_validate_str("[storage]\nwal_mode = \"yes\"\n").unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

#[test]
fn semantic_errors_surface_through_validation() {
    let errors = load_and_validate_str("[vault]\nmaster_kdf_iterations = 10\n").unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("master_kdf_iterations"))));
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader.
//!
//! Merge order, later wins:
//! 1. Compiled defaults
//! 2. `/etc/keyvault/keyvault.toml`
//! 3. `~/.config/keyvault/keyvault.toml`
//! 4. `./keyvault.toml`
//! 5. `KEYVAULT_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeyvaultConfig;

pub fn load_config() -> Result<KeyvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults plus the given TOML string. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<KeyvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then one explicit file, then the environment.
pub fn load_config_from_path(path: &Path) -> Result<KeyvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeyvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeyvaultConfig::default()))
        .merge(Toml::file("/etc/keyvault/keyvault.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keyvault/keyvault.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keyvault.toml"))
        .merge(env_provider())
}

const SECTIONS: [&str; 3] = ["log_", "storage_", "vault_"];

/// Map `KEYVAULT_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `KEYVAULT_VAULT_MASTER_KDF_ITERATIONS` maps to `vault.master_kdf_iterations`.
/// Variables outside the known sections, such as `KEYVAULT_PASSWORD`, belong
/// to the secret prompt and are skipped.
fn env_provider() -> Env {
    Env::prefixed("KEYVAULT_")
        .filter(|key| {
            SECTIONS
                .iter()
                .any(|section| key.as_str().starts_with(section))
        })
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("log_", "log.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KEYVAULT_VAULT_PIN_KDF_ITERATIONS", "20000");
            jail.set_env("KEYVAULT_STORAGE_DATABASE_PATH", "/tmp/kv.db");
            let config = load_config()?;
            assert_eq!(config.vault.pin_kdf_iterations, 20_000);
            assert_eq!(config.storage.database_path, "/tmp/kv.db");
            Ok(())
        });
    }

    #[test]
    fn secret_env_vars_are_not_config_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KEYVAULT_PASSWORD", "Str0ng_P@ss1");
            jail.set_env("KEYVAULT_ITEM_PASSWORD", "hunter22");
            jail.set_env("KEYVAULT_PIN", "1234");
            let config = load_config()?;
            assert_eq!(config.log.level, "info");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("keyvault.toml", "[log]\nlevel = \"debug\"\n")?;
            let config = load_config()?;
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }
}

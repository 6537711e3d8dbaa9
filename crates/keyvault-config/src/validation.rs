// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::KeyvaultConfig;

/// Lowest accepted master-password round count.
pub const MIN_MASTER_KDF_ITERATIONS: u32 = 100_000;

/// Lowest accepted PIN round count.
pub const MIN_PIN_KDF_ITERATIONS: u32 = 1_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &KeyvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let vault = &config.vault;
    if vault.master_kdf_iterations < MIN_MASTER_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.master_kdf_iterations must be at least {MIN_MASTER_KDF_ITERATIONS}, got {}",
                vault.master_kdf_iterations
            ),
        });
    }

    if vault.pin_kdf_iterations < MIN_PIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.pin_kdf_iterations must be at least {MIN_PIN_KDF_ITERATIONS}, got {}",
                vault.pin_kdf_iterations
            ),
        });
    }

    if vault.pin_kdf_iterations >= vault.master_kdf_iterations {
        errors.push(ConfigError::Validation {
            message: "vault.pin_kdf_iterations must be lower than vault.master_kdf_iterations"
                .to_string(),
        });
    }

    if let Some(dir) = &vault.session_dir {
        if dir.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "vault.session_dir must not be empty when set".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

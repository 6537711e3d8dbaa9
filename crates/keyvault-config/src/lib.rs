// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Keyvault credential vault.
//!
//! TOML files are merged over compiled defaults following the XDG hierarchy,
//! `KEYVAULT_*` environment variables override them, and the result is
//! validated before use. Errors come back as miette diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! use keyvault_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{KeyvaultConfig, LogConfig, StorageConfig, VaultConfig};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<KeyvaultConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<KeyvaultConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_path(path).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<KeyvaultConfig, Vec<ConfigError>> {
    let config =
        loader::load_config_from_str(toml_content).map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

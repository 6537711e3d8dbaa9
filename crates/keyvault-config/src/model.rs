// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in a config file
//! fails at startup instead of being silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Keyvault configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyvaultConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level for the `keyvault` targets (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("keyvault").join("keyvault.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keyvault.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Key derivation and session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 rounds for the master password.
    #[serde(default = "default_master_kdf_iterations")]
    pub master_kdf_iterations: u32,

    /// PBKDF2-HMAC-SHA256 rounds for the quick-unlock PIN.
    #[serde(default = "default_pin_kdf_iterations")]
    pub pin_kdf_iterations: u32,

    /// Directory for the session-scoped key mirror. Defaults to
    /// `$XDG_RUNTIME_DIR/keyvault`. With no runtime dir the session is not
    /// mirrored at all.
    #[serde(default)]
    pub session_dir: Option<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            master_kdf_iterations: default_master_kdf_iterations(),
            pin_kdf_iterations: default_pin_kdf_iterations(),
            session_dir: None,
        }
    }
}

fn default_master_kdf_iterations() -> u32 {
    1_000_000
}

fn default_pin_kdf_iterations() -> u32 {
    10_000
}

impl VaultConfig {
    /// Resolved session mirror directory, if the platform has one.
    ///
    /// Never falls back to a disk-backed location such as the temp dir: the
    /// mirror holds the raw vault key and must not outlive the login session.
    pub fn session_dir(&self) -> Option<PathBuf> {
        self.resolve_session_dir(dirs::runtime_dir())
    }

    fn resolve_session_dir(&self, runtime_dir: Option<PathBuf>) -> Option<PathBuf> {
        match &self.session_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => runtime_dir.map(|dir| dir.join("keyvault")),
        }
    }
}

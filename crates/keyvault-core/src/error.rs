// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keyvault credential vault.

use thiserror::Error;

/// The error type shared by every Keyvault crate.
///
/// Callers branch on variants, never on rendered messages. Cipher and
/// storage internals are kept out of the authentication-related variants so a
/// wrong password, a tampered envelope and a malformed envelope all look the
/// same from the outside.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Wrong master password or PIN (the vault key failed to unwrap).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An operation needed the vault key but no session is unlocked.
    #[error("vault is locked")]
    VaultLocked,

    /// A record or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Registration hit the unique constraint on `username`.
    #[error("username `{0}` is already registered")]
    DuplicateUsername(String),

    /// An `add` collided with an existing record id.
    #[error("record `{id}` already exists")]
    AlreadyExists { id: String },

    /// A single record failed to decrypt or parse.
    #[error("record `{id}` is corrupted or unreadable")]
    CorruptedRecord { id: String },

    /// The underlying store failed to open or transact.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Envelope authentication or decoding failed.
    #[error("decryption failed -- wrong key or corrupted data")]
    Decryption,

    /// Key construction or random generation failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Invalid configuration values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Wrap any storage-layer error as [`VaultError::StorageUnavailable`].
    pub fn storage<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        VaultError::StorageUnavailable {
            source: source.into(),
        }
    }
}

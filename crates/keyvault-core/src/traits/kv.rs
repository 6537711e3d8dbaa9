// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String slot store used for the session mirror and the PIN-unlock blob.

use async_trait::async_trait;

use crate::error::VaultError;

/// A small string-keyed slot store.
///
/// The vault uses two of these: a session-scoped one that disappears when the
/// user's session ends, and a durable one that survives restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Remove a slot. Removing an absent slot succeeds.
    async fn remove(&self, key: &str) -> Result<(), VaultError>;
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`KeyValueStore`] that is always unavailable.

use async_trait::async_trait;
use keyvault_core::{KeyValueStore, VaultError};

/// Every operation fails with [`VaultError::StorageUnavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingKeyValueStore;

fn unavailable() -> VaultError {
    VaultError::storage("slot store offline")
}

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, VaultError> {
        Err(unavailable())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), VaultError> {
        Err(unavailable())
    }

    async fn remove(&self, _key: &str) -> Result<(), VaultError> {
        Err(unavailable())
    }
}

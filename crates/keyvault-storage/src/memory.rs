// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime stores.
//!
//! [`MemoryKeyValueStore`] doubles as the session-scoped mirror for
//! long-running hosts: it vanishes with the process.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use keyvault_core::{KeyValueStore, RecordIndex, RecordStore, StoredRecord, VaultError};
use tokio::sync::RwLock;

/// In-memory [`RecordStore`] with the same uniqueness rules as SQLite.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<String, StoredRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn username_clash(
    records: &BTreeMap<String, StoredRecord>,
    record: &StoredRecord,
) -> Option<VaultError> {
    let username = record.index_value(RecordIndex::Username)?;
    records
        .values()
        .any(|other| {
            other.id() != record.id() && other.index_value(RecordIndex::Username) == Some(username)
        })
        .then(|| VaultError::DuplicateUsername(username.to_string()))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn add(&self, record: &StoredRecord) -> Result<(), VaultError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.id()) {
            return Err(VaultError::AlreadyExists {
                id: record.id().to_string(),
            });
        }
        if let Some(err) = username_clash(&records, record) {
            return Err(err);
        }
        records.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    async fn put(&self, record: &StoredRecord) -> Result<(), VaultError> {
        let mut records = self.records.write().await;
        if let Some(err) = username_clash(&records, record) {
            return Err(err);
        }
        records.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, VaultError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<StoredRecord>, VaultError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<(), VaultError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn get_all_by_index(
        &self,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<StoredRecord>, VaultError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.index_value(index) == Some(value))
            .cloned()
            .collect())
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        self.slots.write().await.remove(key);
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait: a keyed table with named secondary indexes.

use async_trait::async_trait;

use crate::error::VaultError;
use crate::types::{RecordIndex, StoredRecord};

/// Persistent table of [`StoredRecord`]s keyed by record id.
///
/// Implementations must maintain [`RecordIndex::Username`] as a unique index
/// and [`RecordIndex::UrlBlindIndex`] as a non-unique one, and must serialize
/// conflicting writes to the same id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name used in log output.
    fn name(&self) -> &str;

    /// Insert a new record. Fails with [`VaultError::AlreadyExists`] if the id
    /// is taken, or [`VaultError::DuplicateUsername`] on a username clash.
    async fn add(&self, record: &StoredRecord) -> Result<(), VaultError>;

    /// Insert or replace a record by id.
    async fn put(&self, record: &StoredRecord) -> Result<(), VaultError>;

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, VaultError>;

    async fn get_all(&self) -> Result<Vec<StoredRecord>, VaultError>;

    /// Remove a record. Deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), VaultError>;

    /// All records whose `index` value equals `value`.
    async fn get_all_by_index(
        &self,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<StoredRecord>, VaultError>;
}

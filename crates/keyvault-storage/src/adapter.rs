// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of [`RecordStore`] and [`KeyValueStore`].

use async_trait::async_trait;
use keyvault_config::StorageConfig;
use keyvault_core::{KeyValueStore, RecordIndex, RecordStore, StoredRecord, VaultError};
use tracing::warn;

use crate::database::Database;
use crate::queries;
use crate::queries::records::{RecordRow, WriteOutcome};

/// SQLite-backed record store.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, VaultError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn to_row(record: &StoredRecord) -> Result<RecordRow, VaultError> {
    let body = serde_json::to_string(record)
        .map_err(|e| VaultError::Internal(format!("failed to serialize record: {e}")))?;
    Ok(RecordRow {
        id: record.id().to_string(),
        kind: record.kind().to_string(),
        username: record.index_value(RecordIndex::Username).map(str::to_string),
        url_blind_index: record
            .index_value(RecordIndex::UrlBlindIndex)
            .map(str::to_string),
        body,
    })
}

fn outcome_to_result(outcome: WriteOutcome, record: &StoredRecord) -> Result<(), VaultError> {
    match outcome {
        WriteOutcome::Written => Ok(()),
        WriteOutcome::IdTaken => Err(VaultError::AlreadyExists {
            id: record.id().to_string(),
        }),
        WriteOutcome::UsernameTaken => Err(VaultError::DuplicateUsername(
            record
                .index_value(RecordIndex::Username)
                .unwrap_or_default()
                .to_string(),
        )),
    }
}

/// Parse rows, dropping any that no longer deserialize.
fn parse_rows(rows: Vec<(String, String)>) -> Vec<StoredRecord> {
    rows.into_iter()
        .filter_map(|(id, body)| match serde_json::from_str(&body) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(id = %id, error = %e, "skipping unparseable record row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn add(&self, record: &StoredRecord) -> Result<(), VaultError> {
        let outcome = queries::records::insert_record(&self.db, to_row(record)?).await?;
        outcome_to_result(outcome, record)
    }

    async fn put(&self, record: &StoredRecord) -> Result<(), VaultError> {
        let outcome = queries::records::upsert_record(&self.db, to_row(record)?).await?;
        outcome_to_result(outcome, record)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, VaultError> {
        match queries::records::get_record_body(&self.db, id).await? {
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|_| VaultError::CorruptedRecord { id: id.to_string() }),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<StoredRecord>, VaultError> {
        let rows = queries::records::list_record_bodies(&self.db).await?;
        Ok(parse_rows(rows))
    }

    async fn delete(&self, id: &str) -> Result<(), VaultError> {
        queries::records::delete_record(&self.db, id).await
    }

    async fn get_all_by_index(
        &self,
        index: RecordIndex,
        value: &str,
    ) -> Result<Vec<StoredRecord>, VaultError> {
        let rows = queries::records::list_record_bodies_by_index(&self.db, index, value).await?;
        Ok(parse_rows(rows))
    }
}

/// Durable slots in the `kv_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    db: Database,
}

impl SqliteKeyValueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        queries::kv::get_value(&self.db, key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        queries::kv::set_value(&self.db, key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        queries::kv::remove_value(&self.db, key).await
    }
}

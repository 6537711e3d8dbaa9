// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a complete vault stack.
//!
//! `TestVault` owns the record store and both slot stores, so a test can
//! "restart the process" with [`TestVault::reopen`] and still see the same
//! persisted state.

use std::sync::Arc;

use keyvault_config::StorageConfig;
use keyvault_core::{KeyValueStore, RecordStore, StoredRecord, VaultError};
use keyvault_storage::{MemoryKeyValueStore, MemoryRecordStore, SqliteKeyValueStore, SqliteRecordStore};
use keyvault_vault::envelope;
use keyvault_vault::{CredentialVaultService, KdfProfile, VaultKey, VaultKeyManager};
use secrecy::SecretString;

/// Master-password rounds used by test vaults.
pub const TEST_MASTER_ITERATIONS: u32 = 1_000;

/// PIN rounds used by test vaults.
pub const TEST_PIN_ITERATIONS: u32 = 10;

/// Builder for [`TestVault`].
pub struct TestVaultBuilder {
    sqlite: bool,
    user: Option<(String, String)>,
    session_store: Option<Arc<dyn KeyValueStore>>,
}

impl TestVaultBuilder {
    fn new() -> Self {
        Self {
            sqlite: false,
            user: None,
            session_store: None,
        }
    }

    /// Back the vault with a SQLite database in a temp directory.
    pub fn sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Register this user during build. The session stays unlocked.
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.user = Some((username.to_string(), password.to_string()));
        self
    }

    /// Replace the session-scoped slot store.
    pub fn with_session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub async fn build(self) -> Result<TestVault, VaultError> {
        let mut temp_dir = None;
        let store: Arc<dyn RecordStore>;
        let durable_store: Arc<dyn KeyValueStore>;
        if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(VaultError::storage)?;
            let config = StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            let sqlite = SqliteRecordStore::open(&config).await?;
            durable_store = Arc::new(SqliteKeyValueStore::new(sqlite.database().clone()));
            store = Arc::new(sqlite);
            temp_dir = Some(dir);
        } else {
            store = Arc::new(MemoryRecordStore::new());
            durable_store = Arc::new(MemoryKeyValueStore::new());
        }
        let session_store = self
            .session_store
            .unwrap_or_else(|| Arc::new(MemoryKeyValueStore::new()));

        let vault = TestVault {
            service: build_service(store.clone(), session_store.clone(), durable_store.clone())?,
            store,
            session_store,
            durable_store,
            _temp_dir: temp_dir,
        };

        if let Some((username, password)) = self.user {
            vault
                .service
                .register(
                    &username,
                    &format!("{username}@example.com"),
                    &SecretString::from(password),
                )
                .await?;
        }
        Ok(vault)
    }
}

fn build_service(
    store: Arc<dyn RecordStore>,
    session_store: Arc<dyn KeyValueStore>,
    durable_store: Arc<dyn KeyValueStore>,
) -> Result<CredentialVaultService, VaultError> {
    let keys = Arc::new(VaultKeyManager::new(
        session_store,
        durable_store,
        KdfProfile::new(TEST_PIN_ITERATIONS)?,
    ));
    Ok(CredentialVaultService::new(
        store,
        keys,
        KdfProfile::new(TEST_MASTER_ITERATIONS)?,
    ))
}

/// A vault service plus direct handles on its stores.
pub struct TestVault {
    pub service: CredentialVaultService,
    pub store: Arc<dyn RecordStore>,
    pub session_store: Arc<dyn KeyValueStore>,
    pub durable_store: Arc<dyn KeyValueStore>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestVault {
    pub fn builder() -> TestVaultBuilder {
        TestVaultBuilder::new()
    }

    /// A fresh, locked service over the same stores.
    pub fn reopen(&self) -> Result<CredentialVaultService, VaultError> {
        build_service(
            self.store.clone(),
            self.session_store.clone(),
            self.durable_store.clone(),
        )
    }

    /// Overwrite one item's password ciphertext with a well-formed envelope
    /// that no vault key opens.
    pub async fn corrupt_item(&self, id: &str) -> Result<(), VaultError> {
        let Some(StoredRecord::Item(mut record)) = self.store.get(id).await? else {
            return Err(VaultError::NotFound(format!("item `{id}`")));
        };
        let stranger = VaultKey::generate()?;
        record.password_ciphertext = envelope::seal_str(stranger.expose(), "p")?;
        self.store.put(&StoredRecord::Item(record)).await
    }
}

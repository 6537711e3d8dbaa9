// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to a ready vault service.

use std::sync::Arc;

use keyvault_config::KeyvaultConfig;
use keyvault_core::{KeyValueStore, VaultError};
use keyvault_storage::{
    MemoryKeyValueStore, SessionDirStore, SqliteKeyValueStore, SqliteRecordStore,
};
use keyvault_vault::{CredentialVaultService, KdfProfile, VaultKeyManager};
use tracing::{debug, warn};

/// A vault service over the configured SQLite database and session directory.
pub struct App {
    pub config: KeyvaultConfig,
    pub service: CredentialVaultService,
}

impl App {
    /// Open storage and restore any session mirrored by an earlier invocation.
    pub async fn open(config: KeyvaultConfig) -> Result<Self, VaultError> {
        let store = SqliteRecordStore::open(&config.storage).await?;
        let durable = SqliteKeyValueStore::new(store.database().clone());
        let session: Arc<dyn KeyValueStore> = match config.vault.session_dir() {
            Some(dir) => Arc::new(SessionDirStore::new(dir)),
            None => {
                warn!("no runtime dir available, session will not outlive this process");
                Arc::new(MemoryKeyValueStore::new())
            }
        };

        let keys = Arc::new(VaultKeyManager::new(
            session,
            Arc::new(durable),
            KdfProfile::pin(&config.vault)?,
        ));
        let service =
            CredentialVaultService::new(Arc::new(store), keys, KdfProfile::master(&config.vault)?);

        if service.keys().restore_session().await {
            debug!("resumed unlocked session");
        }
        Ok(Self { config, service })
    }
}

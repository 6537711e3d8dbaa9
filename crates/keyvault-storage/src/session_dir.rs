// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped slots stored as files in a runtime directory.
//!
//! `$XDG_RUNTIME_DIR` is tmpfs owned by the user and removed when the last
//! login session ends, which gives the CLI a mirror that survives between
//! invocations but not past logout or reboot. Files are created `0600` inside
//! a `0700` directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keyvault_core::{KeyValueStore, VaultError};
use tokio::io::AsyncWriteExt;

/// [`KeyValueStore`] over files in one directory.
#[derive(Debug, Clone)]
pub struct SessionDirStore {
    dir: PathBuf,
}

impl SessionDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, VaultError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid || key.starts_with('.') {
            return Err(VaultError::Internal(format!("invalid session slot name `{key}`")));
        }
        Ok(self.dir.join(key))
    }

    async fn ensure_dir(&self) -> Result<(), VaultError> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);
        builder.create(&self.dir).await.map_err(VaultError::storage)
    }
}

#[async_trait]
impl KeyValueStore for SessionDirStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let path = self.slot_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::storage(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        let path = self.slot_path(key)?;
        self.ensure_dir().await?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&path).await.map_err(VaultError::storage)?;
        file.write_all(value.as_bytes())
            .await
            .map_err(VaultError::storage)?;
        file.flush().await.map_err(VaultError::storage)
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        let path = self.slot_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionDirStore::new(dir.path().join("session"));

        assert!(store.get("keyvault.session.vault_key").await.unwrap().is_none());
        store.set("keyvault.session.vault_key", "{}").await.unwrap();
        assert_eq!(
            store.get("keyvault.session.vault_key").await.unwrap().as_deref(),
            Some("{}")
        );
        store.remove("keyvault.session.vault_key").await.unwrap();
        store.remove("keyvault.session.vault_key").await.unwrap();
        assert!(store.get("keyvault.session.vault_key").await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slot_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionDirStore::new(dir.path());
        store.set("slot", "secret").await.unwrap();
        let mode = std::fs::metadata(dir.path().join("slot"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionDirStore::new(dir.path());
        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get(".hidden").await.is_err());
    }
}

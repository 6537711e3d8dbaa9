// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection setup: PRAGMAs, WAL mode, migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Clones of [`Database`] share that one connection.

use keyvault_core::VaultError;
use tracing::debug;

use crate::migrations;

/// Handle to the Keyvault SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VaultError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(VaultError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VaultError::storage(format!("failed to open database {path}: {e}")))?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path = %path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, VaultError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| VaultError::storage(format!("failed to open in-memory database: {e}")))?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), VaultError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
                if wal_mode {
                    let _mode: String =
                        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
                    conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
                }
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<(), refinery::Error> { migrations::run_migrations(conn) })
            .await
            .map_err(|e| VaultError::storage(format!("migration failed: {e}")))
    }
}

/// Convert tokio-rusqlite errors to [`VaultError::StorageUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultError {
    VaultError::storage(format!("database error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vault.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('records', 'kv_store') ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(tables, vec!["kv_store".to_string(), "records".to_string()]);
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let path = path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        assert!(Database::open(path, true).await.is_ok());
    }
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable slot operations on `kv_store`.

use keyvault_core::VaultError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

pub async fn get_value(db: &Database, key: &str) -> Result<Option<String>, VaultError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_value(db: &Database, key: &str, value: &str) -> Result<(), VaultError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_value(db: &Database, key: &str) -> Result<(), VaultError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD on the `records` table.
//!
//! Rows carry the serialized record in `body`, plus the index columns
//! (`username`, `url_blind_index`) lifted out so SQLite can seek on them.

use keyvault_core::{RecordIndex, VaultError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// A `records` row ready for insertion.
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub id: String,
    pub kind: String,
    pub username: Option<String>,
    pub url_blind_index: Option<String>,
    pub body: String,
}

/// Result of a write that may hit a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    IdTaken,
    UsernameTaken,
}

/// Insert a new row, refusing to overwrite an existing id or username.
///
/// The checks and the insert run in one closure on the writer thread, so no
/// other write can slip in between them.
pub async fn insert_record(db: &Database, row: RecordRow) -> Result<WriteOutcome, VaultError> {
    db.connection()
        .call(move |conn| -> Result<WriteOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let id_taken: bool = tx
                .query_row("SELECT 1 FROM records WHERE id = ?1", params![row.id], |_| Ok(true))
                .optional()?
                .unwrap_or(false);
            if id_taken {
                return Ok(WriteOutcome::IdTaken);
            }
            if username_owner(&tx, row.username.as_deref())?.is_some() {
                return Ok(WriteOutcome::UsernameTaken);
            }
            tx.execute(
                "INSERT INTO records (id, kind, username, url_blind_index, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.kind, row.username, row.url_blind_index, row.body],
            )?;
            tx.commit()?;
            Ok(WriteOutcome::Written)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a row by id. A username owned by a different id is
/// still rejected.
pub async fn upsert_record(db: &Database, row: RecordRow) -> Result<WriteOutcome, VaultError> {
    db.connection()
        .call(move |conn| -> Result<WriteOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            if let Some(owner) = username_owner(&tx, row.username.as_deref())? {
                if owner != row.id {
                    return Ok(WriteOutcome::UsernameTaken);
                }
            }
            tx.execute(
                "INSERT INTO records (id, kind, username, url_blind_index, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    kind = excluded.kind,
                    username = excluded.username,
                    url_blind_index = excluded.url_blind_index,
                    body = excluded.body",
                params![row.id, row.kind, row.username, row.url_blind_index, row.body],
            )?;
            tx.commit()?;
            Ok(WriteOutcome::Written)
        })
        .await
        .map_err(map_tr_err)
}

fn username_owner(
    conn: &rusqlite::Connection,
    username: Option<&str>,
) -> Result<Option<String>, rusqlite::Error> {
    match username {
        Some(name) => conn
            .query_row(
                "SELECT id FROM records WHERE username = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional(),
        None => Ok(None),
    }
}

/// Fetch the serialized body of one record.
pub async fn get_record_body(db: &Database, id: &str) -> Result<Option<String>, VaultError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row("SELECT body FROM records WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All `(id, body)` pairs in insertion order.
pub async fn list_record_bodies(db: &Database) -> Result<Vec<(String, String)>, VaultError> {
    db.connection()
        .call(|conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT id, body FROM records ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// `(id, body)` pairs whose index column equals `value`.
pub async fn list_record_bodies_by_index(
    db: &Database,
    index: RecordIndex,
    value: &str,
) -> Result<Vec<(String, String)>, VaultError> {
    let sql = match index {
        RecordIndex::Username => "SELECT id, body FROM records WHERE username = ?1 ORDER BY rowid",
        RecordIndex::UrlBlindIndex => {
            "SELECT id, body FROM records WHERE url_blind_index = ?1 ORDER BY rowid"
        }
    };
    let value = value.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params![value], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a record. Absent ids are not an error.
pub async fn delete_record(db: &Database, id: &str) -> Result<(), VaultError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage backends for the Keyvault credential vault.
//!
//! - [`SqliteRecordStore`] / [`SqliteKeyValueStore`]: WAL-mode SQLite with
//!   embedded migrations and a single-writer model via `tokio-rusqlite`.
//! - [`MemoryRecordStore`] / [`MemoryKeyValueStore`]: process-lifetime stores.
//! - [`SessionDirStore`]: files in a per-login runtime directory, used as the
//!   session-scoped key mirror by the CLI.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod session_dir;

pub use adapter::{SqliteKeyValueStore, SqliteRecordStore};
pub use database::Database;
pub use memory::{MemoryKeyValueStore, MemoryRecordStore};
pub use session_dir::SessionDirStore;

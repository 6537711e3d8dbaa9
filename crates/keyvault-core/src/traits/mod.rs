// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store traits implemented by the storage backends.
//!
//! Both traits use `#[async_trait]` so the vault can hold them as
//! `Arc<dyn ...>` and swap SQLite for in-memory stores in tests.

pub mod kv;
pub mod store;

pub use kv::KeyValueStore;
pub use store::RecordStore;

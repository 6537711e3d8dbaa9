// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyvault credential vault.
//!
//! This crate holds the pieces every other Keyvault crate agrees on: the
//! [`VaultError`] taxonomy, the record types that cross the storage
//! boundary, and the async store traits implemented by the storage backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::VaultError;
pub use traits::{KeyValueStore, RecordStore};
pub use types::{
    CustomField, MasterSecretRecord, RecordIndex, RecordKind, StoredRecord, VaultRecord,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_error_has_all_variants() {
        let _invalid = VaultError::InvalidCredentials;
        let _locked = VaultError::VaultLocked;
        let _not_found = VaultError::NotFound("item 42".into());
        let _dup = VaultError::DuplicateUsername("alice".into());
        let _exists = VaultError::AlreadyExists { id: "x".into() };
        let _corrupt = VaultError::CorruptedRecord { id: "x".into() };
        let _storage = VaultError::StorageUnavailable {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        let _decrypt = VaultError::Decryption;
        let _crypto = VaultError::Crypto("rng".into());
        let _config = VaultError::Config("bad".into());
        let _internal = VaultError::Internal("oops".into());
    }

    #[test]
    fn all_store_traits_are_exported() {
        fn _assert_record_store<T: RecordStore>() {}
        fn _assert_key_value_store<T: KeyValueStore>() {}
    }
}

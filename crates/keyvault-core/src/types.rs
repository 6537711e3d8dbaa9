// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types that cross the storage boundary.
//!
//! Users and vault items share one table. Every persisted record carries an
//! explicit `kind` tag, so backends and the vault service never have to guess
//! what a row is from the fields it happens to have.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discriminator written next to every persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    User,
    Item,
}

/// Secondary indexes every [`RecordStore`](crate::RecordStore) must maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum RecordIndex {
    /// Unique, plaintext index over [`MasterSecretRecord::username`].
    #[strum(serialize = "username")]
    Username,
    /// Non-unique index over [`VaultRecord::url_blind_index`].
    #[strum(serialize = "urlBlindIndex")]
    UrlBlindIndex,
}

/// Per-user key material. One per registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterSecretRecord {
    pub id: String,
    /// Plaintext, globally unique.
    pub username: String,
    /// Email sealed under the vault key.
    pub email_ciphertext: String,
    /// Base64 of the 16-byte KDF salt. Replaced on every password change.
    pub salt: String,
    /// Raw vault key sealed under the master key.
    pub wrapped_vault_key: String,
    /// PBKDF2 rounds used to derive the master key that produced
    /// `wrapped_vault_key`.
    #[serde(default = "default_master_iterations")]
    pub kdf_iterations: u32,
}

fn default_master_iterations() -> u32 {
    1_000_000
}

/// One stored credential. Every text field is an envelope under the vault key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub id: String,
    pub url_ciphertext: String,
    /// Deterministic token over the normalized host. Not unique.
    pub url_blind_index: String,
    pub username_ciphertext: String,
    pub password_ciphertext: String,
    pub created_at: DateTime<Utc>,
    /// Sealed JSON array of [`CustomField`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_ciphertext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_ciphertext: Option<String>,
}

/// A persisted record as seen by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoredRecord {
    User(MasterSecretRecord),
    Item(VaultRecord),
}

impl StoredRecord {
    pub fn id(&self) -> &str {
        match self {
            StoredRecord::User(user) => &user.id,
            StoredRecord::Item(item) => &item.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            StoredRecord::User(_) => RecordKind::User,
            StoredRecord::Item(_) => RecordKind::Item,
        }
    }

    /// The value this record contributes to `index`, if any.
    pub fn index_value(&self, index: RecordIndex) -> Option<&str> {
        match (self, index) {
            (StoredRecord::User(user), RecordIndex::Username) => Some(&user.username),
            (StoredRecord::Item(item), RecordIndex::UrlBlindIndex) => Some(&item.url_blind_index),
            _ => None,
        }
    }
}

/// A user-defined `{name, value}` pair attached to a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_item() -> VaultRecord {
        VaultRecord {
            id: "item-1".into(),
            url_ciphertext: "a:b:c".into(),
            url_blind_index: "token".into(),
            username_ciphertext: "a:b:c".into(),
            password_ciphertext: "a:b:c".into(),
            created_at: Utc::now(),
            fields_ciphertext: None,
            note_ciphertext: None,
        }
    }

    #[test]
    fn stored_record_carries_explicit_kind_tag() {
        let json = serde_json::to_value(StoredRecord::Item(sample_item())).unwrap();
        assert_eq!(json["kind"], "item");
        assert_eq!(json["urlBlindIndex"], "token");
        assert!(json.get("noteCiphertext").is_none());
    }

    #[test]
    fn user_record_without_iterations_uses_default() {
        let json = r#"{
            "kind": "user",
            "id": "u1",
            "username": "alice",
            "emailCiphertext": "x:y:z",
            "salt": "AAAAAAAAAAAAAAAAAAAAAA==",
            "wrappedVaultKey": "x:y:z"
        }"#;
        let record: StoredRecord = serde_json::from_str(json).unwrap();
        match record {
            StoredRecord::User(user) => assert_eq!(user.kdf_iterations, 1_000_000),
            StoredRecord::Item(_) => panic!("expected a user record"),
        }
    }

    #[test]
    fn index_value_only_matches_own_kind() {
        let item = StoredRecord::Item(sample_item());
        assert_eq!(item.index_value(RecordIndex::UrlBlindIndex), Some("token"));
        assert_eq!(item.index_value(RecordIndex::Username), None);
        assert_eq!(item.kind(), RecordKind::Item);
        assert_eq!(item.id(), "item-1");
    }

    #[test]
    fn record_index_names_round_trip() {
        assert_eq!(RecordIndex::UrlBlindIndex.to_string(), "urlBlindIndex");
        assert_eq!(RecordIndex::from_str("username").unwrap(), RecordIndex::Username);
        assert_eq!(RecordKind::from_str("item").unwrap(), RecordKind::Item);
        assert_eq!(RecordKind::User.to_string(), "user");
    }
}

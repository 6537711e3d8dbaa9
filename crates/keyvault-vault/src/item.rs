// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plaintext views of stored credentials.

use chrono::{DateTime, Utc};
use keyvault_core::CustomField;
use secrecy::SecretString;

/// Input for adding or replacing a credential.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub url: String,
    pub username: String,
    pub password: SecretString,
    pub fields: Vec<CustomField>,
    pub note: Option<String>,
}

impl ItemInput {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            fields: Vec::new(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(CustomField {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// A decrypted credential. The password stays wrapped in [`SecretString`].
#[derive(Debug, Clone)]
pub struct VaultItem {
    pub id: String,
    pub url: String,
    pub username: String,
    pub password: SecretString,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<CustomField>,
    pub note: Option<String>,
}

/// Result of a bulk read: every readable item plus a count of the rest.
#[derive(Debug, Default)]
pub struct VaultListing {
    pub items: Vec<VaultItem>,
    pub skipped: usize,
}

/// Mask all but the last `visible` characters of a secret.
pub fn mask_secret(secret: &str, visible: usize) -> String {
    let total = secret.chars().count();
    if total <= visible {
        return "*".repeat(total);
    }
    let tail: String = secret.chars().skip(total - visible).collect();
    format!("{}{tail}", "*".repeat(total - visible))
}

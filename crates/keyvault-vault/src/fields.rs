// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field-level sealing under the resident vault key.

use keyvault_core::VaultError;

use crate::envelope;
use crate::keys::VaultKey;

/// Seals and opens individual record fields with one vault key.
///
/// Optional fields go through [`FieldCipher::seal_optional`] and
/// [`FieldCipher::open_optional`] so absent values never reach the envelope.
#[derive(Debug, Clone)]
pub struct FieldCipher {
    key: VaultKey,
}

impl FieldCipher {
    pub fn new(key: VaultKey) -> Self {
        Self { key }
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, VaultError> {
        envelope::seal_str(self.key.expose(), plaintext)
    }

    pub fn open(&self, packed: &str) -> Result<String, VaultError> {
        envelope::open_str(self.key.expose(), packed)
    }

    pub fn seal_optional(&self, plaintext: Option<&str>) -> Result<Option<String>, VaultError> {
        map_present(plaintext, |value| self.seal(value))
    }

    pub fn open_optional(&self, packed: Option<&str>) -> Result<Option<String>, VaultError> {
        map_present(packed, |value| self.open(value))
    }
}

/// Apply `f` only when a value is present.
fn map_present<F>(value: Option<&str>, f: F) -> Result<Option<String>, VaultError>
where
    F: FnOnce(&str) -> Result<String, VaultError>,
{
    value.map(f).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_skip_absent_values() {
        let cipher = FieldCipher::new(VaultKey::generate().unwrap());
        assert_eq!(cipher.seal_optional(None).unwrap(), None);
        assert_eq!(cipher.open_optional(None).unwrap(), None);

        let sealed = cipher.seal_optional(Some("note")).unwrap().unwrap();
        assert_ne!(sealed, "note");
        assert_eq!(
            cipher.open_optional(Some(&sealed)).unwrap().as_deref(),
            Some("note")
        );
    }

    #[test]
    fn foreign_key_cannot_open_fields() {
        let sealed = FieldCipher::new(VaultKey::generate().unwrap())
            .seal("secret")
            .unwrap();
        let other = FieldCipher::new(VaultKey::generate().unwrap());
        assert!(matches!(other.open(&sealed), Err(VaultError::Decryption)));
    }
}

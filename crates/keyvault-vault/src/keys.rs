// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault key and its wrapping under a master key.
//!
//! Two tiers: a password-derived master key that only ever wraps, and one
//! random vault key that encrypts every stored field. Changing the password
//! re-wraps the vault key; stored items are untouched.

use std::sync::Arc;

use keyvault_core::VaultError;
use zeroize::Zeroizing;

use crate::aead;
use crate::envelope;

/// Length of every symmetric key (AES-256).
pub const KEY_LEN: usize = 32;

/// The raw vault key.
///
/// Cloning shares one zeroizing buffer, so a task that captured the key keeps
/// a valid copy even if the session is cleared while it runs. The buffer is
/// wiped when the last clone drops.
#[derive(Clone)]
pub struct VaultKey(Arc<Zeroizing<[u8; KEY_LEN]>>);

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}

impl VaultKey {
    /// A fresh random vault key.
    pub fn generate() -> Result<Self, VaultError> {
        Ok(Self::from_bytes(aead::random_bytes::<KEY_LEN>()?))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Arc::new(Zeroizing::new(bytes)))
    }

    /// Build from a slice, rejecting anything that is not exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self::from_bytes(array))
    }

    pub fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Seal the raw vault key under `master_key`.
pub fn wrap_vault_key(master_key: &[u8; KEY_LEN], vault_key: &VaultKey) -> Result<String, VaultError> {
    envelope::seal(master_key, vault_key.expose())
}

/// Recover the vault key. Every failure, whether wrong key, tampering, or a
/// malformed blob, is reported as [`VaultError::InvalidCredentials`].
pub fn unwrap_vault_key(master_key: &[u8; KEY_LEN], wrapped: &str) -> Result<VaultKey, VaultError> {
    let raw = Zeroizing::new(
        envelope::open(master_key, wrapped).map_err(|_| VaultError::InvalidCredentials)?,
    );
    VaultKey::from_slice(&raw).ok_or(VaultError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_returns_same_key() {
        let master = [4u8; KEY_LEN];
        let key = VaultKey::generate().unwrap();
        let wrapped = wrap_vault_key(&master, &key).unwrap();
        let unwrapped = unwrap_vault_key(&master, &wrapped).unwrap();
        assert_eq!(unwrapped.expose(), key.expose());
    }

    #[test]
    fn wrong_master_key_is_invalid_credentials() {
        let key = VaultKey::generate().unwrap();
        let wrapped = wrap_vault_key(&[4u8; KEY_LEN], &key).unwrap();
        assert!(matches!(
            unwrap_vault_key(&[5u8; KEY_LEN], &wrapped),
            Err(VaultError::InvalidCredentials)
        ));
        assert!(matches!(
            unwrap_vault_key(&[4u8; KEY_LEN], "not-an-envelope"),
            Err(VaultError::InvalidCredentials)
        ));
    }

    #[test]
    fn short_payload_is_rejected() {
        let master = [6u8; KEY_LEN];
        let wrapped = envelope::seal(&master, b"too short").unwrap();
        assert!(matches!(
            unwrap_vault_key(&master, &wrapped),
            Err(VaultError::InvalidCredentials)
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = VaultKey::from_bytes([0xAB; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "VaultKey([REDACTED])");
    }
}

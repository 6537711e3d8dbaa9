// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based key derivation (PBKDF2-HMAC-SHA256).
//!
//! Two cost profiles exist: a high one for the master password and a cheaper
//! one for the quick-unlock PIN. The same `(secret, salt, profile)` always
//! yields the same key, which is what lets login re-derive the registration
//! key.

use std::num::NonZeroU32;

use keyvault_config::VaultConfig;
use keyvault_core::VaultError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::keys::KEY_LEN;

/// Length of every KDF salt.
pub const SALT_LEN: usize = 16;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Iteration count for one derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfProfile {
    iterations: NonZeroU32,
}

impl KdfProfile {
    pub fn new(iterations: u32) -> Result<Self, VaultError> {
        NonZeroU32::new(iterations)
            .map(|iterations| Self { iterations })
            .ok_or_else(|| VaultError::Config("KDF iteration count must be non-zero".to_string()))
    }

    /// Profile for the master password.
    pub fn master(config: &VaultConfig) -> Result<Self, VaultError> {
        Self::new(config.master_kdf_iterations)
    }

    /// Profile for the quick-unlock PIN.
    pub fn pin(config: &VaultConfig) -> Result<Self, VaultError> {
        Self::new(config.pin_kdf_iterations)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }
}

/// Derive a 256-bit key from `secret` and `salt`.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8; SALT_LEN],
    profile: KdfProfile,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(ALGORITHM, profile.iterations, salt, secret, output.as_mut());
    output
}

/// [`derive_key`] on the blocking pool, so a million rounds never stall the
/// async runtime.
pub async fn derive_key_async(
    secret: &SecretString,
    salt: [u8; SALT_LEN],
    profile: KdfProfile,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let secret = Zeroizing::new(secret.expose_secret().as_bytes().to_vec());
    tokio::task::spawn_blocking(move || derive_key(&secret, &salt, profile))
        .await
        .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))
}

/// Fresh random salt from the system CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| VaultError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> KdfProfile {
        KdfProfile::new(1_000).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"Str0ng_P@ss1", &salt, cheap());
        let b = derive_key(b"Str0ng_P@ss1", &salt, cheap());
        assert_eq!(*a, *b);
    }

    #[test]
    fn secret_salt_and_cost_all_change_the_key() {
        let salt = [1u8; SALT_LEN];
        let base = derive_key(b"secret", &salt, cheap());
        assert_ne!(*base, *derive_key(b"secret!", &salt, cheap()));
        assert_ne!(*base, *derive_key(b"secret", &[2u8; SALT_LEN], cheap()));
        assert_ne!(
            *base,
            *derive_key(b"secret", &salt, KdfProfile::new(1_001).unwrap())
        );
    }

    #[test]
    fn zero_iterations_are_rejected() {
        assert!(matches!(KdfProfile::new(0), Err(VaultError::Config(_))));
    }

    #[test]
    fn profiles_follow_config() {
        let config = VaultConfig::default();
        assert_eq!(KdfProfile::master(&config).unwrap().iterations(), 1_000_000);
        assert_eq!(KdfProfile::pin(&config).unwrap().iterations(), 10_000);
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[tokio::test]
    async fn async_derivation_matches_sync() {
        let salt = [9u8; SALT_LEN];
        let secret = SecretString::from("1234".to_string());
        let off_thread = derive_key_async(&secret, salt, cheap()).await.unwrap();
        assert_eq!(*off_thread, *derive_key(b"1234", &salt, cheap()));
    }
}

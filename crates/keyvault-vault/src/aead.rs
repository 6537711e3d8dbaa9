// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open.
//!
//! Every [`seal`] draws a fresh 96-bit nonce from the system CSPRNG. Nonce
//! reuse under one key breaks GCM, so callers never supply their own.

use keyvault_core::VaultError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::keys::KEY_LEN;

pub const NONCE_LEN: usize = 12;

fn cipher(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, VaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext`, returning `(ciphertext_with_tag, nonce)`.
pub fn seal(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), VaultError> {
    let cipher = cipher(key)?;
    let nonce_bytes: [u8; NONCE_LEN] = random_bytes()?;

    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| VaultError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate. Any failure is [`VaultError::Decryption`].
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, VaultError> {
    let cipher = cipher(key).map_err(|_| VaultError::Decryption)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = cipher
        .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
        .map_err(|_| VaultError::Decryption)?;
    Ok(plaintext.to_vec())
}

/// `N` bytes from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], VaultError> {
    let mut bytes = [0u8; N];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| VaultError::Crypto("system random source failed".to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = random_bytes::<KEY_LEN>().unwrap();
        let (ciphertext, nonce) = seal(&key, b"vault key bytes").unwrap();
        assert_eq!(open(&key, &nonce, &ciphertext).unwrap(), b"vault key bytes");
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let key = random_bytes::<KEY_LEN>().unwrap();
        let (ct1, n1) = seal(&key, b"same").unwrap();
        let (ct2, n2) = seal(&key, b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn wrong_key_fails() {
        let (ciphertext, nonce) = seal(&[1u8; KEY_LEN], b"secret").unwrap();
        assert!(matches!(
            open(&[2u8; KEY_LEN], &nonce, &ciphertext),
            Err(VaultError::Decryption)
        ));
    }

    #[test]
    fn tag_is_appended() {
        let (ciphertext, _) = seal(&[3u8; KEY_LEN], b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + 16);
    }
}

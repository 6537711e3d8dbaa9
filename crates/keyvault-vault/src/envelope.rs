// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-describing ciphertext envelope.
//!
//! Wire format: `base64(salt):base64(nonce):base64(ciphertext||tag)`.
//!
//! Each call draws a fresh salt, derives a one-off AES-256-GCM sub-key from
//! the caller's key with HKDF-SHA256, and seals under that. The salt travels
//! with the ciphertext so [`open`] needs nothing but the top-level key.
//!
//! [`open`] reports every failure as [`VaultError::Decryption`]: wrong key,
//! tampered bytes, bad base64 and the wrong number of segments are
//! indistinguishable to the caller.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use keyvault_core::VaultError;
use ring::hkdf;
use zeroize::Zeroizing;

use crate::aead::{self, NONCE_LEN};
use crate::keys::KEY_LEN;

/// Length of the per-envelope HKDF salt.
pub const ENVELOPE_SALT_LEN: usize = 16;

const SUBKEY_INFO: &[u8] = b"keyvault envelope v1";

fn sub_key(key: &[u8; KEY_LEN], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(key);
    let info = [SUBKEY_INFO];
    let okm = prk
        .expand(&info, hkdf::HKDF_SHA256)
        .map_err(|_| VaultError::Crypto("envelope sub-key expansion failed".to_string()))?;
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    okm.fill(out.as_mut())
        .map_err(|_| VaultError::Crypto("envelope sub-key expansion failed".to_string()))?;
    Ok(out)
}

/// Seal `plaintext` under `key` into a packed envelope string.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<String, VaultError> {
    let salt: [u8; ENVELOPE_SALT_LEN] = aead::random_bytes()?;
    let sub_key = sub_key(key, &salt)?;
    let (ciphertext, nonce) = aead::seal(&sub_key, plaintext)?;
    Ok(format!(
        "{}:{}:{}",
        STANDARD.encode(salt),
        STANDARD.encode(nonce),
        STANDARD.encode(ciphertext)
    ))
}

/// Open a packed envelope.
pub fn open(key: &[u8; KEY_LEN], packed: &str) -> Result<Vec<u8>, VaultError> {
    let segments: Vec<&str> = packed.split(':').collect();
    let [salt, nonce, ciphertext] = segments.as_slice() else {
        return Err(VaultError::Decryption);
    };

    let salt = decode(salt)?;
    let nonce: [u8; NONCE_LEN] = decode(nonce)?
        .try_into()
        .map_err(|_| VaultError::Decryption)?;
    let ciphertext = decode(ciphertext)?;
    if salt.len() != ENVELOPE_SALT_LEN {
        return Err(VaultError::Decryption);
    }

    let sub_key = sub_key(key, &salt).map_err(|_| VaultError::Decryption)?;
    aead::open(&sub_key, &nonce, &ciphertext)
}

/// [`seal`] for text.
pub fn seal_str(key: &[u8; KEY_LEN], plaintext: &str) -> Result<String, VaultError> {
    seal(key, plaintext.as_bytes())
}

/// [`open`] for text. Non-UTF-8 plaintext is a decryption failure.
pub fn open_str(key: &[u8; KEY_LEN], packed: &str) -> Result<String, VaultError> {
    String::from_utf8(open(key, packed)?).map_err(|_| VaultError::Decryption)
}

fn decode(segment: &str) -> Result<Vec<u8>, VaultError> {
    STANDARD.decode(segment).map_err(|_| VaultError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KEY: [u8; KEY_LEN] = [0x42; KEY_LEN];

    fn segments(packed: &str) -> Vec<Vec<u8>> {
        packed.split(':').map(|s| STANDARD.decode(s).unwrap()).collect()
    }

    fn repack(parts: &[Vec<u8>]) -> String {
        parts
            .iter()
            .map(|p| STANDARD.encode(p))
            .collect::<Vec<_>>()
            .join(":")
    }

    #[test]
    fn packed_format_has_three_segments_of_expected_size() {
        let packed = seal_str(&KEY, "hunter2").unwrap();
        let parts = segments(&packed);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), ENVELOPE_SALT_LEN);
        assert_eq!(parts[1].len(), NONCE_LEN);
        assert_eq!(parts[2].len(), "hunter2".len() + 16);
    }

    #[test]
    fn same_plaintext_seals_differently() {
        assert_ne!(seal_str(&KEY, "x").unwrap(), seal_str(&KEY, "x").unwrap());
    }

    #[test]
    fn empty_string_round_trips() {
        let packed = seal_str(&KEY, "").unwrap();
        assert_eq!(open_str(&KEY, &packed).unwrap(), "");
    }

    #[test]
    fn malformed_inputs_all_fail_identically() {
        let good = seal_str(&KEY, "value").unwrap();
        let two_segments = good.rsplitn(2, ':').nth(1).unwrap().to_string();
        let cases = [
            String::new(),
            "abc".to_string(),
            two_segments,
            format!("{good}:extra"),
            "!!!:###:$$$".to_string(),
        ];
        for case in cases {
            let err = open(&KEY, &case).unwrap_err();
            assert!(matches!(err, VaultError::Decryption), "case {case:?}");
            assert_eq!(
                err.to_string(),
                "decryption failed -- wrong key or corrupted data"
            );
        }
    }

    #[test]
    fn wrong_key_fails_with_same_error() {
        let packed = seal_str(&KEY, "value").unwrap();
        assert!(matches!(
            open(&[0x43; KEY_LEN], &packed),
            Err(VaultError::Decryption)
        ));
    }

    #[test]
    fn swapped_salt_fails() {
        let packed = seal_str(&KEY, "value").unwrap();
        let mut parts = segments(&packed);
        parts[0] = vec![0u8; ENVELOPE_SALT_LEN];
        assert!(open(&KEY, &repack(&parts)).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_any_string(s in ".*") {
            let packed = seal_str(&KEY, &s).unwrap();
            prop_assert_eq!(open_str(&KEY, &packed).unwrap(), s);
        }

        #[test]
        fn flipping_any_ciphertext_or_nonce_byte_is_detected(
            s in ".{0,64}",
            segment in 1usize..3,
            position in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let packed = seal_str(&KEY, &s).unwrap();
            let mut parts = segments(&packed);
            let target = &mut parts[segment];
            let i = position.index(target.len());
            target[i] ^= mask;
            prop_assert!(open(&KEY, &repack(&parts)).is_err());
        }
    }
}

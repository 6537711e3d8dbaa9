// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyed tokens for equality lookup over encrypted records.
//!
//! A token is HMAC-SHA256 over the normalized value, keyed by a sub-key that
//! HKDF derives from the caller's secret. Equal inputs under one secret give
//! equal tokens; without the secret a token says nothing about its input.
//! Tokens only narrow candidates: distinct hosts may collide, so callers
//! confirm every hit against decrypted plaintext.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use keyvault_core::VaultError;
use ring::{hkdf, hmac};
use zeroize::Zeroizing;

use crate::keys::KEY_LEN;
use crate::site::normalize_url;

const INDEX_KEY_INFO: &[u8] = b"keyvault blind index v1";

/// Token generator bound to one secret.
pub struct BlindIndex {
    key: hmac::Key,
}

impl std::fmt::Debug for BlindIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlindIndex([REDACTED])")
    }
}

impl BlindIndex {
    pub fn new(secret: &[u8]) -> Result<Self, VaultError> {
        let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, &[]).extract(secret);
        let info = [INDEX_KEY_INFO];
        let okm = prk
            .expand(&info, hkdf::HKDF_SHA256)
            .map_err(|_| VaultError::Crypto("blind index key expansion failed".to_string()))?;
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        okm.fill(raw.as_mut())
            .map_err(|_| VaultError::Crypto("blind index key expansion failed".to_string()))?;
        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, raw.as_ref()),
        })
    }

    /// Token for an already-normalized value.
    pub fn token(&self, normalized_value: &str) -> String {
        let tag = hmac::sign(&self.key, normalized_value.as_bytes());
        STANDARD.encode(tag.as_ref())
    }

    /// Token for a URL or host, normalized first.
    pub fn url_token(&self, url: &str) -> String {
        self.token(&normalize_url(url))
    }
}

/// One-shot [`BlindIndex::token`].
pub fn index(secret: &[u8], normalized_value: &str) -> Result<String, VaultError> {
    Ok(BlindIndex::new(secret)?.token(normalized_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; KEY_LEN] = [0x11; KEY_LEN];

    #[test]
    fn equivalent_urls_share_a_token() {
        let index = BlindIndex::new(&SECRET).unwrap();
        assert_eq!(
            index.url_token("https://Login.Example.com/path"),
            index.url_token("login.example.com")
        );
    }

    #[test]
    fn different_hosts_get_different_tokens() {
        let index = BlindIndex::new(&SECRET).unwrap();
        assert_ne!(
            index.url_token("login.example.com"),
            index.url_token("example.com")
        );
    }

    #[test]
    fn token_depends_on_secret() {
        let a = index(&SECRET, "example.com").unwrap();
        let b = index(&[0x12; KEY_LEN], "example.com").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, index(&SECRET, "example.com").unwrap());
    }

    #[test]
    fn token_does_not_contain_the_value() {
        let token = index(&SECRET, "example.com").unwrap();
        assert!(!token.contains("example"));
        assert_eq!(STANDARD.decode(&token).unwrap().len(), 32);
    }
}

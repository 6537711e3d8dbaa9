// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session key lifecycle: the one place the raw vault key lives.
//!
//! [`VaultKeyManager`] moves between `Locked` and `Unlocked`. While unlocked
//! the key can be mirrored into a session-scoped slot so a restarted process
//! in the same login session comes back unlocked, and it can be wrapped under
//! a PIN-derived key for quick unlock. [`VaultKeyManager::clear`] undoes all
//! three.

use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use keyvault_core::{KeyValueStore, VaultError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::aead::{self, NONCE_LEN};
use crate::kdf::{self, KdfProfile, SALT_LEN};
use crate::keys::VaultKey;

/// Session-scoped slot holding the exported vault key.
pub const SESSION_KEY_SLOT: &str = "keyvault.session.vault_key";

/// Durable slot holding the PIN-wrapped vault key.
pub const PIN_UNLOCK_SLOT: &str = "keyvault.pin_unlock";

/// Observable lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked,
}

enum KeyState {
    Locked,
    Unlocked(VaultKey),
}

/// Vault key wrapped under a PIN-derived key.
#[derive(Debug, Serialize, Deserialize)]
struct PinUnlockBlob {
    salt: String,
    iv: String,
    ciphertext: String,
}

/// JSON Web Key form of the vault key, used for the session mirror.
#[derive(Serialize, Deserialize)]
struct ExportedKey {
    kty: String,
    alg: String,
    k: String,
    ext: bool,
    key_ops: Vec<String>,
}

impl ExportedKey {
    fn from_key(key: &VaultKey) -> Self {
        Self {
            kty: "oct".to_string(),
            alg: "A256GCM".to_string(),
            k: URL_SAFE_NO_PAD.encode(key.expose()),
            ext: true,
            key_ops: vec!["encrypt".to_string(), "decrypt".to_string()],
        }
    }

    fn into_key(self) -> Result<VaultKey, VaultError> {
        if self.kty != "oct" || self.alg != "A256GCM" {
            return Err(VaultError::Decryption);
        }
        let raw = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(self.k.as_bytes())
                .map_err(|_| VaultError::Decryption)?,
        );
        VaultKey::from_slice(&raw).ok_or(VaultError::Decryption)
    }
}

/// Owns the resident vault key for one session.
pub struct VaultKeyManager {
    state: RwLock<KeyState>,
    session_store: Arc<dyn KeyValueStore>,
    durable_store: Arc<dyn KeyValueStore>,
    pin_profile: KdfProfile,
}

impl std::fmt::Debug for VaultKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeyManager")
            .field("pin_iterations", &self.pin_profile.iterations())
            .finish_non_exhaustive()
    }
}

impl VaultKeyManager {
    /// A locked manager. `session_store` must not outlive the user's session;
    /// `durable_store` holds the PIN blob across restarts.
    pub fn new(
        session_store: Arc<dyn KeyValueStore>,
        durable_store: Arc<dyn KeyValueStore>,
        pin_profile: KdfProfile,
    ) -> Self {
        Self {
            state: RwLock::new(KeyState::Locked),
            session_store,
            durable_store,
            pin_profile,
        }
    }

    pub async fn state(&self) -> SessionState {
        match *self.state.read().await {
            KeyState::Locked => SessionState::Locked,
            KeyState::Unlocked(_) => SessionState::Unlocked,
        }
    }

    /// The resident key, or [`VaultError::VaultLocked`].
    ///
    /// The returned handle stays valid after a later [`clear`](Self::clear),
    /// so work that already started can finish with the key it captured.
    pub async fn get_key(&self) -> Result<VaultKey, VaultError> {
        match &*self.state.read().await {
            KeyState::Unlocked(key) => Ok(key.clone()),
            KeyState::Locked => Err(VaultError::VaultLocked),
        }
    }

    /// Unwrap `wrapped_vault_key` with a derived master key and hold the result.
    ///
    /// A wrong master key fails with [`VaultError::InvalidCredentials`] and
    /// leaves the state untouched.
    pub async fn unlock_with_master_key(
        &self,
        master_key: &[u8; 32],
        wrapped_vault_key: &str,
    ) -> Result<(), VaultError> {
        let key = crate::keys::unwrap_vault_key(master_key, wrapped_vault_key)?;
        self.install(key).await;
        info!("vault unlocked");
        Ok(())
    }

    pub(crate) async fn install(&self, key: VaultKey) {
        *self.state.write().await = KeyState::Unlocked(key);
    }

    /// Mirror the resident key into the session-scoped slot.
    pub async fn persist_session(&self) -> Result<(), VaultError> {
        let key = self.get_key().await?;
        let exported = Zeroizing::new(
            serde_json::to_string(&ExportedKey::from_key(&key))
                .map_err(|e| VaultError::Internal(format!("failed to export session key: {e}")))?,
        );
        self.session_store.set(SESSION_KEY_SLOT, &exported).await?;
        debug!("session key mirrored");
        Ok(())
    }

    /// Reload the key from the session mirror. Returns whether the session is
    /// now unlocked. Missing or unreadable mirrors leave it locked.
    pub async fn restore_session(&self) -> bool {
        let stored = match self.session_store.get(SESSION_KEY_SLOT).await {
            Ok(Some(stored)) => Zeroizing::new(stored),
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "session key mirror unavailable");
                return false;
            }
        };

        let restored = serde_json::from_str::<ExportedKey>(&stored)
            .map_err(|_| VaultError::Decryption)
            .and_then(ExportedKey::into_key);
        match restored {
            Ok(key) => {
                self.install(key).await;
                debug!("session restored from mirror");
                true
            }
            Err(_) => {
                warn!("session key mirror is corrupted, staying locked");
                false
            }
        }
    }

    /// Wrap the resident key under a key derived from `pin` and store it durably.
    pub async fn enable_pin_unlock(&self, pin: &SecretString) -> Result<(), VaultError> {
        let key = self.get_key().await?;
        let salt = kdf::generate_salt()?;
        let pin_key = kdf::derive_key_async(pin, salt, self.pin_profile).await?;
        let (ciphertext, iv) = aead::seal(&pin_key, key.expose())?;

        let blob = PinUnlockBlob {
            salt: STANDARD.encode(salt),
            iv: STANDARD.encode(iv),
            ciphertext: STANDARD.encode(ciphertext),
        };
        let json = serde_json::to_string(&blob)
            .map_err(|e| VaultError::Internal(format!("failed to encode PIN blob: {e}")))?;
        self.durable_store.set(PIN_UNLOCK_SLOT, &json).await?;
        info!("PIN unlock enabled");
        Ok(())
    }

    /// Unlock with a PIN. Returns `false` on any failure, including when no
    /// PIN is configured.
    pub async fn unlock_with_pin(&self, pin: &SecretString) -> bool {
        match self.open_pin_blob(pin).await {
            Ok(key) => {
                self.install(key).await;
                if let Err(e) = self.persist_session().await {
                    warn!(error = %e, "failed to mirror session after PIN unlock");
                }
                info!("vault unlocked with PIN");
                true
            }
            Err(e) => {
                debug!(error = %e, "PIN unlock failed");
                false
            }
        }
    }

    async fn open_pin_blob(&self, pin: &SecretString) -> Result<VaultKey, VaultError> {
        let json = self
            .durable_store
            .get(PIN_UNLOCK_SLOT)
            .await?
            .ok_or_else(|| VaultError::NotFound("PIN unlock blob".to_string()))?;
        let blob: PinUnlockBlob =
            serde_json::from_str(&json).map_err(|_| VaultError::Decryption)?;

        let salt: [u8; SALT_LEN] = decode_fixed(&blob.salt)?;
        let iv: [u8; NONCE_LEN] = decode_fixed(&blob.iv)?;
        let ciphertext = STANDARD
            .decode(blob.ciphertext.as_bytes())
            .map_err(|_| VaultError::Decryption)?;

        let pin_key = kdf::derive_key_async(pin, salt, self.pin_profile).await?;
        let raw = Zeroizing::new(
            aead::open(&pin_key, &iv, &ciphertext).map_err(|_| VaultError::InvalidCredentials)?,
        );
        VaultKey::from_slice(&raw).ok_or(VaultError::InvalidCredentials)
    }

    pub async fn has_pin_unlock(&self) -> Result<bool, VaultError> {
        Ok(self.durable_store.get(PIN_UNLOCK_SLOT).await?.is_some())
    }

    /// Lock, drop the session mirror, and delete the PIN configuration.
    ///
    /// Safe to call when already locked.
    pub async fn clear(&self) -> Result<(), VaultError> {
        *self.state.write().await = KeyState::Locked;
        let session = self.session_store.remove(SESSION_KEY_SLOT).await;
        let pin = self.durable_store.remove(PIN_UNLOCK_SLOT).await;
        info!("vault locked");
        session.and(pin)
    }
}

fn decode_fixed<const N: usize>(encoded: &str) -> Result<[u8; N], VaultError> {
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| VaultError::Decryption)?
        .try_into()
        .map_err(|_| VaultError::Decryption)
}

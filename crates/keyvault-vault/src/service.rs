// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential vault service: accounts, items, site lookup, and password
//! rotation on top of a [`RecordStore`] and a [`VaultKeyManager`].
//!
//! Items are sealed under the vault key, never the master key. Rotating the
//! master password therefore rewrites one user record and leaves every item
//! untouched.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use keyvault_core::{
    CustomField, MasterSecretRecord, RecordIndex, RecordStore, StoredRecord, VaultError,
    VaultRecord,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blind_index::BlindIndex;
use crate::fields::FieldCipher;
use crate::item::{ItemInput, VaultItem, VaultListing};
use crate::kdf::{self, KdfProfile, SALT_LEN};
use crate::keys::{self, VaultKey};
use crate::session::VaultKeyManager;
use crate::site::{candidate_hosts, host_matches, normalize_url};

/// Orchestrates every vault operation. Holds no key material of its own.
pub struct CredentialVaultService {
    store: Arc<dyn RecordStore>,
    keys: Arc<VaultKeyManager>,
    master_profile: KdfProfile,
}

impl std::fmt::Debug for CredentialVaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVaultService")
            .field("store", &self.store.name())
            .field("master_iterations", &self.master_profile.iterations())
            .finish_non_exhaustive()
    }
}

impl CredentialVaultService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: Arc<VaultKeyManager>,
        master_profile: KdfProfile,
    ) -> Self {
        Self {
            store,
            keys,
            master_profile,
        }
    }

    pub fn keys(&self) -> &Arc<VaultKeyManager> {
        &self.keys
    }

    // --- accounts ---

    /// Create a user with a fresh vault key and leave the session unlocked.
    ///
    /// A store holds one user's vault. Items carry no owner, so when a second
    /// user registers in the same store each user sees the other's items as
    /// unreadable and they are counted in [`VaultListing::skipped`].
    ///
    /// Returns the new user's record id.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<String, VaultError> {
        if self.find_user(username).await?.is_some() {
            return Err(VaultError::DuplicateUsername(username.to_string()));
        }

        let salt = kdf::generate_salt()?;
        let master_key = kdf::derive_key_async(password, salt, self.master_profile).await?;
        let vault_key = VaultKey::generate()?;
        let wrapped_vault_key = keys::wrap_vault_key(&master_key, &vault_key)?;
        let email_ciphertext = FieldCipher::new(vault_key.clone()).seal(email)?;

        let id = Uuid::new_v4().to_string();
        let record = MasterSecretRecord {
            id: id.clone(),
            username: username.to_string(),
            email_ciphertext,
            salt: STANDARD.encode(salt),
            wrapped_vault_key,
            kdf_iterations: self.master_profile.iterations(),
        };
        self.store.add(&StoredRecord::User(record)).await?;

        self.keys.install(vault_key).await;
        self.mirror_session().await;
        info!(user_id = %id, "vault registered");
        Ok(id)
    }

    /// Derive the master key from `password` and unlock the session.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), VaultError> {
        let user = self.require_user(username).await?;
        let master_key = self.derive_master_key(&user, password).await?;
        self.keys
            .unlock_with_master_key(&master_key, &user.wrapped_vault_key)
            .await?;
        self.mirror_session().await;
        Ok(())
    }

    /// Lock the session and forget the PIN configuration.
    pub async fn logout(&self) -> Result<(), VaultError> {
        self.keys.clear().await
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool, VaultError> {
        Ok(self.find_user(username).await?.is_some())
    }

    /// Decrypt the registered email of `username`. Requires an unlocked session.
    pub async fn user_email(&self, username: &str) -> Result<String, VaultError> {
        let key = self.keys.get_key().await?;
        let user = self.require_user(username).await?;
        FieldCipher::new(key)
            .open(&user.email_ciphertext)
            .map_err(|_| VaultError::CorruptedRecord { id: user.id })
    }

    /// Re-wrap the vault key under a new master password.
    ///
    /// The old password is proven first; a wrong one fails with
    /// [`VaultError::InvalidCredentials`] and nothing is written. No item is
    /// re-encrypted.
    pub async fn change_master_password(
        &self,
        username: &str,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), VaultError> {
        let user = self.require_user(username).await?;
        let old_master_key = self.derive_master_key(&user, old_password).await?;
        let vault_key = keys::unwrap_vault_key(&old_master_key, &user.wrapped_vault_key)?;

        let salt = kdf::generate_salt()?;
        let new_master_key = kdf::derive_key_async(new_password, salt, self.master_profile).await?;
        let wrapped_vault_key = keys::wrap_vault_key(&new_master_key, &vault_key)?;

        let user_id = user.id.clone();
        let updated = MasterSecretRecord {
            salt: STANDARD.encode(salt),
            wrapped_vault_key,
            kdf_iterations: self.master_profile.iterations(),
            ..user
        };
        self.store.put(&StoredRecord::User(updated)).await?;
        info!(user_id = %user_id, "master password rotated");
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<MasterSecretRecord>, VaultError> {
        let hits = self
            .store
            .get_all_by_index(RecordIndex::Username, username)
            .await?;
        Ok(hits.into_iter().find_map(|record| match record {
            StoredRecord::User(user) => Some(user),
            StoredRecord::Item(_) => None,
        }))
    }

    async fn require_user(&self, username: &str) -> Result<MasterSecretRecord, VaultError> {
        self.find_user(username)
            .await?
            .ok_or_else(|| VaultError::NotFound(format!("user `{username}`")))
    }

    async fn derive_master_key(
        &self,
        user: &MasterSecretRecord,
        password: &SecretString,
    ) -> Result<zeroize::Zeroizing<[u8; 32]>, VaultError> {
        let corrupted = || VaultError::CorruptedRecord {
            id: user.id.clone(),
        };
        let salt: [u8; SALT_LEN] = STANDARD
            .decode(user.salt.as_bytes())
            .map_err(|_| corrupted())?
            .try_into()
            .map_err(|_| corrupted())?;
        let profile = KdfProfile::new(user.kdf_iterations).map_err(|_| corrupted())?;
        kdf::derive_key_async(password, salt, profile).await
    }

    async fn mirror_session(&self) {
        if let Err(e) = self.keys.persist_session().await {
            warn!(error = %e, "failed to mirror session key");
        }
    }

    // --- items ---

    /// Seal and store a new credential. Returns its id.
    pub async fn add_item(&self, input: &ItemInput) -> Result<String, VaultError> {
        let key = self.keys.get_key().await?;
        let id = Uuid::new_v4().to_string();
        let record = seal_record(&key, id.clone(), Utc::now(), input)?;
        self.store.add(&StoredRecord::Item(record)).await?;
        debug!(item_id = %id, "item added");
        Ok(id)
    }

    /// Replace every field of an existing credential, keeping its id and
    /// creation time. All ciphertext and the blind index are regenerated.
    pub async fn update_item(&self, id: &str, input: &ItemInput) -> Result<(), VaultError> {
        let key = self.keys.get_key().await?;
        let existing = self.require_item(id).await?;
        let record = seal_record(&key, existing.id, existing.created_at, input)?;
        self.store.put(&StoredRecord::Item(record)).await?;
        debug!(item_id = %id, "item updated");
        Ok(())
    }

    /// Decrypt one credential. Corruption is fatal here.
    pub async fn get_item(&self, id: &str) -> Result<VaultItem, VaultError> {
        let key = self.keys.get_key().await?;
        let record = self.require_item(id).await?;
        open_record(&FieldCipher::new(key), &record)
    }

    /// Decrypt every credential concurrently.
    ///
    /// Records that fail to decrypt are logged and counted in
    /// [`VaultListing::skipped`]; they never fail the listing.
    pub async fn get_all_items(&self) -> Result<VaultListing, VaultError> {
        let key = self.keys.get_key().await?;
        let cipher = FieldCipher::new(key);
        let records = self.store.get_all().await?;

        let tasks = records.into_iter().filter_map(|record| match record {
            StoredRecord::Item(item) => {
                let cipher = cipher.clone();
                Some(tokio::task::spawn_blocking(move || {
                    open_record(&cipher, &item)
                }))
            }
            StoredRecord::User(_) => None,
        });

        let mut listing = VaultListing::default();
        for outcome in futures::future::join_all(tasks).await {
            match outcome {
                Ok(Ok(item)) => listing.items.push(item),
                Ok(Err(e)) => {
                    warn!(error = %e, "skipping unreadable vault record");
                    listing.skipped += 1;
                }
                Err(e) => {
                    warn!(error = %e, "decrypt task failed, skipping record");
                    listing.skipped += 1;
                }
            }
        }
        listing.items.sort_by_key(|item| item.created_at);

        if listing.skipped > 0 {
            warn!(
                skipped = listing.skipped,
                returned = listing.items.len(),
                "vault listing skipped unreadable records"
            );
        }
        Ok(listing)
    }

    /// Remove a credential. Absent ids succeed.
    pub async fn delete_item(&self, id: &str) -> Result<(), VaultError> {
        self.keys.get_key().await?;
        self.store.delete(id).await?;
        debug!(item_id = %id, "item deleted");
        Ok(())
    }

    /// The credential saved for this site and username, if any. Used to
    /// block duplicate saves.
    pub async fn find_item_by_url_and_username(
        &self,
        url: &str,
        username: &str,
    ) -> Result<Option<VaultItem>, VaultError> {
        self.find_site_match(url, Some(username)).await
    }

    /// The first credential whose site matches the page at `url`.
    pub async fn find_credentials_for_url(&self, url: &str) -> Result<Option<VaultItem>, VaultError> {
        self.find_site_match(url, None).await
    }

    async fn require_item(&self, id: &str) -> Result<VaultRecord, VaultError> {
        match self.store.get(id).await? {
            Some(StoredRecord::Item(record)) => Ok(record),
            _ => Err(VaultError::NotFound(format!("item `{id}`"))),
        }
    }

    /// Query the blind index for the page host and its root domain, then
    /// confirm each hit against the decrypted URL.
    async fn find_site_match(
        &self,
        url: &str,
        username: Option<&str>,
    ) -> Result<Option<VaultItem>, VaultError> {
        let key = self.keys.get_key().await?;
        let index = BlindIndex::new(key.expose())?;
        let cipher = FieldCipher::new(key);
        let page_host = normalize_url(url);

        for candidate in candidate_hosts(&page_host) {
            let hits = self
                .store
                .get_all_by_index(RecordIndex::UrlBlindIndex, &index.token(&candidate))
                .await?;
            for hit in hits {
                let StoredRecord::Item(record) = hit else {
                    continue;
                };
                let item = match open_record(&cipher, &record) {
                    Ok(item) => item,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable index hit");
                        continue;
                    }
                };
                if !host_matches(&page_host, &normalize_url(&item.url)) {
                    continue;
                }
                if username.is_some_and(|wanted| wanted != item.username) {
                    continue;
                }
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

fn seal_record(
    key: &VaultKey,
    id: String,
    created_at: DateTime<Utc>,
    input: &ItemInput,
) -> Result<VaultRecord, VaultError> {
    let cipher = FieldCipher::new(key.clone());
    let index = BlindIndex::new(key.expose())?;
    let fields_json = if input.fields.is_empty() {
        None
    } else {
        Some(
            serde_json::to_string(&input.fields)
                .map_err(|e| VaultError::Internal(format!("failed to encode custom fields: {e}")))?,
        )
    };

    Ok(VaultRecord {
        id,
        url_ciphertext: cipher.seal(&input.url)?,
        url_blind_index: index.url_token(&input.url),
        username_ciphertext: cipher.seal(&input.username)?,
        password_ciphertext: cipher.seal(input.password.expose_secret())?,
        created_at,
        fields_ciphertext: cipher.seal_optional(fields_json.as_deref())?,
        note_ciphertext: cipher.seal_optional(input.note.as_deref())?,
    })
}

/// Decrypt a record. Every failure is reported as
/// [`VaultError::CorruptedRecord`] for that record.
fn open_record(cipher: &FieldCipher, record: &VaultRecord) -> Result<VaultItem, VaultError> {
    let corrupted = || VaultError::CorruptedRecord {
        id: record.id.clone(),
    };
    let fields = match cipher
        .open_optional(record.fields_ciphertext.as_deref())
        .map_err(|_| corrupted())?
    {
        Some(json) => {
            serde_json::from_str::<Vec<CustomField>>(&json).map_err(|_| corrupted())?
        }
        None => Vec::new(),
    };

    Ok(VaultItem {
        id: record.id.clone(),
        url: cipher.open(&record.url_ciphertext).map_err(|_| corrupted())?,
        username: cipher
            .open(&record.username_ciphertext)
            .map_err(|_| corrupted())?,
        password: SecretString::from(
            cipher
                .open(&record.password_ciphertext)
                .map_err(|_| corrupted())?,
        ),
        created_at: record.created_at,
        fields,
        note: cipher
            .open_optional(record.note_ciphertext.as_deref())
            .map_err(|_| corrupted())?,
    })
}

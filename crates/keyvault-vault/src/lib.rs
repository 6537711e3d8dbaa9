// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic vault engine for Keyvault.
//!
//! Two-tier key hierarchy: a PBKDF2-derived master key wraps a random vault
//! key, and the vault key seals every credential field. Site lookups go
//! through a keyed blind index so the store can be searched without
//! decrypting it.

pub mod aead;
pub mod blind_index;
pub mod envelope;
pub mod fields;
pub mod generator;
pub mod item;
pub mod kdf;
pub mod keys;
pub mod prompt;
pub mod service;
pub mod session;
pub mod site;

pub use blind_index::BlindIndex;
pub use generator::{generate_password, PasswordPolicy};
pub use item::{mask_secret, ItemInput, VaultItem, VaultListing};
pub use kdf::KdfProfile;
pub use keys::VaultKey;
pub use service::CredentialVaultService;
pub use session::{SessionState, VaultKeyManager};

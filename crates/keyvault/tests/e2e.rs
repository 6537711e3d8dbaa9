// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end vault scenarios over the full stack.

use std::sync::Arc;

use keyvault_core::VaultError;
use keyvault_test_utils::{FailingKeyValueStore, TestVault};
use keyvault_vault::{ItemInput, SessionState};
use secrecy::{ExposeSecret, SecretString};

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn alice_full_lifecycle() {
    let vault = TestVault::builder().sqlite().build().await.unwrap();
    let service = &vault.service;

    service
        .register("alice", "alice@example.com", &secret("Str0ng_P@ss1"))
        .await
        .unwrap();
    service.logout().await.unwrap();

    service.login("alice", &secret("Str0ng_P@ss1")).await.unwrap();
    assert!(service.keys().get_key().await.is_ok());

    service.logout().await.unwrap();
    assert!(matches!(
        service.login("alice", &secret("wrong")).await,
        Err(VaultError::InvalidCredentials)
    ));
    assert_eq!(service.keys().state().await, SessionState::Locked);
    service.login("alice", &secret("Str0ng_P@ss1")).await.unwrap();

    let id = service
        .add_item(&ItemInput::new("site.com", "u", "p"))
        .await
        .unwrap();
    let listing = service.get_all_items().await.unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].password.expose_secret(), "p");
    let created_at = listing.items[0].created_at;

    service
        .change_master_password("alice", &secret("Str0ng_P@ss1"), &secret("NewStr0ng_P@ss2"))
        .await
        .unwrap();
    service.logout().await.unwrap();
    service
        .login("alice", &secret("NewStr0ng_P@ss2"))
        .await
        .unwrap();

    let listing = service.get_all_items().await.unwrap();
    assert_eq!(listing.items.len(), 1);
    let item = &listing.items[0];
    assert_eq!(item.id, id);
    assert_eq!(item.url, "site.com");
    assert_eq!(item.username, "u");
    assert_eq!(item.password.expose_secret(), "p");
    assert_eq!(item.created_at, created_at);
    assert_eq!(listing.skipped, 0);
}

#[tokio::test]
async fn five_valid_one_corrupted() {
    let vault = TestVault::builder()
        .sqlite()
        .with_user("alice", "Str0ng_P@ss1")
        .build()
        .await
        .unwrap();
    let mut ids = Vec::new();
    for n in 0..6 {
        ids.push(
            vault
                .service
                .add_item(&ItemInput::new(format!("site{n}.com"), "u", "p"))
                .await
                .unwrap(),
        );
    }
    vault.corrupt_item(&ids[3]).await.unwrap();

    let listing = vault.service.get_all_items().await.unwrap();
    assert_eq!(listing.items.len(), 5);
    assert_eq!(listing.skipped, 1);
    assert!(listing.items.iter().all(|item| item.id != ids[3]));
}

#[tokio::test]
async fn pin_unlock_after_restart() {
    let vault = TestVault::builder()
        .with_user("alice", "Str0ng_P@ss1")
        .build()
        .await
        .unwrap();
    vault
        .service
        .keys()
        .enable_pin_unlock(&secret("2580"))
        .await
        .unwrap();
    let id = vault
        .service
        .add_item(&ItemInput::new("example.com", "a", "p"))
        .await
        .unwrap();

    let restarted = vault.reopen().unwrap();
    assert!(matches!(
        restarted.get_item(&id).await,
        Err(VaultError::VaultLocked)
    ));
    assert!(!restarted.keys().unlock_with_pin(&secret("0000")).await);
    assert!(restarted.keys().unlock_with_pin(&secret("2580")).await);
    let found = restarted
        .find_credentials_for_url("https://www.example.com/login")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);

    restarted.logout().await.unwrap();
    assert!(!restarted.keys().has_pin_unlock().await.unwrap());
    assert!(!vault.reopen().unwrap().keys().restore_session().await);
}

#[tokio::test]
async fn login_succeeds_when_session_mirror_is_unavailable() {
    let vault = TestVault::builder()
        .with_session_store(Arc::new(FailingKeyValueStore))
        .with_user("alice", "Str0ng_P@ss1")
        .build()
        .await
        .unwrap();
    assert_eq!(vault.service.keys().state().await, SessionState::Unlocked);

    let reopened = vault.reopen().unwrap();
    assert!(!reopened.keys().restore_session().await);
    reopened
        .login("alice", &secret("Str0ng_P@ss1"))
        .await
        .unwrap();
    assert_eq!(reopened.keys().state().await, SessionState::Unlocked);
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers.

use colored::Colorize;
use keyvault_core::{CustomField, VaultError};
use keyvault_vault::prompt::{
    self, ITEM_PASSWORD_ENV_VAR, NEW_PASSWORD_ENV_VAR, PASSWORD_ENV_VAR, PIN_ENV_VAR,
};
use keyvault_vault::{
    generate_password, CredentialVaultService, ItemInput, PasswordPolicy, SessionState, VaultItem,
};
use secrecy::{ExposeSecret, SecretString};

use crate::app::App;
use crate::output::{item_detail, item_line, ItemView, ListingView};

/// Item flags shared by `add` and `edit`.
#[derive(Debug, Clone, Default)]
pub struct ItemArgs {
    pub url: Option<String>,
    pub username: Option<String>,
    pub note: Option<String>,
    pub fields: Vec<CustomField>,
    /// Generate the password instead of prompting for it.
    pub generate: Option<PasswordPolicy>,
    /// Prompt for a new password on `edit`.
    pub new_password: bool,
    /// Drop the stored note on `edit`.
    pub clear_note: bool,
    /// Drop every stored custom field on `edit`.
    pub clear_fields: bool,
}

fn item_password(args: &ItemArgs) -> Result<SecretString, VaultError> {
    match &args.generate {
        Some(policy) => generate_password(policy),
        None => prompt::read_new_secret(ITEM_PASSWORD_ENV_VAR, "item password"),
    }
}

pub async fn register(service: &CredentialVaultService, username: &str, email: &str) -> Result<(), VaultError> {
    let password = prompt::read_new_secret(PASSWORD_ENV_VAR, "master password")?;
    service.register(username, email, &password).await?;
    println!("{} registered {username}; vault unlocked", "ok:".green());
    Ok(())
}

pub async fn login(service: &CredentialVaultService, username: &str) -> Result<(), VaultError> {
    let password = prompt::read_secret(PASSWORD_ENV_VAR, "master password")?;
    service.login(username, &password).await?;
    println!("{} vault unlocked", "ok:".green());
    Ok(())
}

pub async fn unlock_pin(service: &CredentialVaultService) -> Result<(), VaultError> {
    let pin = prompt::read_secret(PIN_ENV_VAR, "PIN")?;
    if service.keys().unlock_with_pin(&pin).await {
        println!("{} vault unlocked", "ok:".green());
        Ok(())
    } else {
        Err(VaultError::InvalidCredentials)
    }
}

pub async fn enable_pin(service: &CredentialVaultService) -> Result<(), VaultError> {
    let pin = prompt::read_new_secret(PIN_ENV_VAR, "PIN")?;
    service.keys().enable_pin_unlock(&pin).await?;
    println!("{} PIN unlock enabled", "ok:".green());
    Ok(())
}

pub async fn logout(service: &CredentialVaultService) -> Result<(), VaultError> {
    service.logout().await?;
    println!("{} vault locked", "ok:".green());
    Ok(())
}

pub async fn status(app: &App) -> Result<(), VaultError> {
    let keys = app.service.keys();
    let state = match keys.state().await {
        SessionState::Unlocked => "unlocked".green(),
        SessionState::Locked => "locked".yellow(),
    };
    let pin = if keys.has_pin_unlock().await? {
        "enabled"
    } else {
        "disabled"
    };
    println!("vault:    {state}");
    println!("pin:      {pin}");
    println!("database: {}", app.config.storage.database_path);
    match app.config.vault.session_dir() {
        Some(dir) => println!("session:  {}", dir.display()),
        None => println!("session:  not mirrored (no runtime dir)"),
    }
    Ok(())
}

pub async fn add(service: &CredentialVaultService, args: ItemArgs) -> Result<(), VaultError> {
    let (Some(url), Some(username)) = (args.url.clone(), args.username.clone()) else {
        return Err(VaultError::Config("add needs a url and a username".to_string()));
    };
    if let Some(existing) = service.find_item_by_url_and_username(&url, &username).await? {
        return Err(VaultError::AlreadyExists { id: existing.id });
    }

    let password = item_password(&args)?;
    let input = ItemInput {
        url,
        username,
        password,
        fields: args.fields,
        note: args.note,
    };
    let id = service.add_item(&input).await?;
    println!("{} added {id}", "ok:".green());
    if args.generate.is_some() {
        println!("password: {}", input.password.expose_secret());
    }
    Ok(())
}

/// Apply the given flags over the current item and store the result.
pub async fn edit(service: &CredentialVaultService, id: &str, args: ItemArgs) -> Result<(), VaultError> {
    let current = service.get_item(id).await?;
    let password = if args.generate.is_some() || args.new_password {
        item_password(&args)?
    } else {
        current.password.clone()
    };
    let input = merge_edit(current, args, password);
    service.update_item(id, &input).await?;
    println!("{} updated {id}", "ok:".green());
    Ok(())
}

/// The full replacement for an edited item: flags win, clear flags drop the
/// stored value, everything else is carried over.
fn merge_edit(current: VaultItem, args: ItemArgs, password: SecretString) -> ItemInput {
    let fields = if args.clear_fields {
        Vec::new()
    } else if args.fields.is_empty() {
        current.fields
    } else {
        args.fields
    };
    let note = if args.clear_note {
        None
    } else {
        args.note.or(current.note)
    };
    ItemInput {
        url: args.url.unwrap_or(current.url),
        username: args.username.unwrap_or(current.username),
        password,
        fields,
        note,
    }
}

pub async fn list(service: &CredentialVaultService, reveal: bool, json: bool) -> Result<(), VaultError> {
    let listing = service.get_all_items().await?;
    if json {
        let view = ListingView {
            items: listing
                .items
                .iter()
                .map(|item| ItemView::new(item, reveal))
                .collect(),
            skipped: listing.skipped,
        };
        let body = serde_json::to_string_pretty(&view)
            .map_err(|e| VaultError::Internal(format!("failed to render listing: {e}")))?;
        println!("{body}");
        return Ok(());
    }

    if listing.items.is_empty() {
        println!("{}", "vault is empty".dimmed());
    }
    for item in &listing.items {
        println!("{}", item_line(item, reveal));
    }
    if listing.skipped > 0 {
        eprintln!(
            "{} {} unreadable record(s) skipped",
            "warning:".yellow(),
            listing.skipped
        );
    }
    Ok(())
}

pub async fn show(service: &CredentialVaultService, id: &str, reveal: bool) -> Result<(), VaultError> {
    let item = service.get_item(id).await?;
    print!("{}", item_detail(&item, reveal));
    Ok(())
}

pub async fn find(
    service: &CredentialVaultService,
    url: &str,
    username: Option<&str>,
    reveal: bool,
) -> Result<(), VaultError> {
    let found = match username {
        Some(username) => service.find_item_by_url_and_username(url, username).await?,
        None => service.find_credentials_for_url(url).await?,
    };
    match found {
        Some(item) => print!("{}", item_detail(&item, reveal)),
        None => println!("{}", "no matching credential".dimmed()),
    }
    Ok(())
}

pub async fn delete(service: &CredentialVaultService, id: &str) -> Result<(), VaultError> {
    service.delete_item(id).await?;
    println!("{} deleted {id}", "ok:".green());
    Ok(())
}

pub async fn change_password(service: &CredentialVaultService, username: &str) -> Result<(), VaultError> {
    let old = prompt::read_secret(PASSWORD_ENV_VAR, "current master password")?;
    let new = prompt::read_new_secret(NEW_PASSWORD_ENV_VAR, "master password")?;
    service.change_master_password(username, &old, &new).await?;
    println!("{} master password changed", "ok:".green());
    Ok(())
}

pub fn generate(policy: &PasswordPolicy) -> Result<(), VaultError> {
    let password = generate_password(policy)?;
    println!("{}", password.expose_secret());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> VaultItem {
        VaultItem {
            id: "id-1".to_string(),
            url: "site.com".to_string(),
            username: "u".to_string(),
            password: SecretString::from("p".to_string()),
            created_at: Utc::now(),
            fields: vec![CustomField {
                name: "pin".to_string(),
                value: "0000".to_string(),
            }],
            note: Some("old note".to_string()),
        }
    }

    fn keep() -> SecretString {
        SecretString::from("p".to_string())
    }

    #[test]
    fn edit_without_flags_keeps_everything() {
        let input = merge_edit(stored(), ItemArgs::default(), keep());
        assert_eq!(input.url, "site.com");
        assert_eq!(input.username, "u");
        assert_eq!(input.fields.len(), 1);
        assert_eq!(input.note.as_deref(), Some("old note"));
    }

    #[test]
    fn edit_flags_replace_values() {
        let args = ItemArgs {
            username: Some("v".to_string()),
            note: Some("new note".to_string()),
            fields: vec![CustomField {
                name: "q".to_string(),
                value: "a".to_string(),
            }],
            ..ItemArgs::default()
        };
        let input = merge_edit(stored(), args, keep());
        assert_eq!(input.username, "v");
        assert_eq!(input.note.as_deref(), Some("new note"));
        assert_eq!(input.fields[0].name, "q");
    }

    #[test]
    fn clear_flags_drop_note_and_fields() {
        let args = ItemArgs {
            clear_note: true,
            clear_fields: true,
            ..ItemArgs::default()
        };
        let input = merge_edit(stored(), args, keep());
        assert!(input.note.is_none());
        assert!(input.fields.is_empty());
        assert_eq!(input.url, "site.com");
    }
}

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering for vault items.

use colored::Colorize;
use keyvault_core::CustomField;
use keyvault_vault::{mask_secret, VaultItem};
use secrecy::ExposeSecret;
use serde::Serialize;

/// Item shape for `--json` output. The password is present only when revealed.
#[derive(Debug, Serialize)]
pub struct ItemView<'a> {
    pub id: &'a str,
    pub url: &'a str,
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub created_at: String,
    pub fields: &'a [CustomField],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

impl<'a> ItemView<'a> {
    pub fn new(item: &'a VaultItem, reveal: bool) -> Self {
        Self {
            id: &item.id,
            url: &item.url,
            username: &item.username,
            password: reveal.then(|| item.password.expose_secret()),
            created_at: item.created_at.to_rfc3339(),
            fields: &item.fields,
            note: item.note.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingView<'a> {
    pub items: Vec<ItemView<'a>>,
    pub skipped: usize,
}

fn password_text(item: &VaultItem, reveal: bool) -> String {
    if reveal {
        item.password.expose_secret().to_string()
    } else {
        mask_secret(item.password.expose_secret(), 0)
    }
}

/// One line per item.
pub fn item_line(item: &VaultItem, reveal: bool) -> String {
    format!(
        "{}  {}  {}  {}",
        item.id.dimmed(),
        item.url.bold(),
        item.username,
        password_text(item, reveal)
    )
}

/// Multi-line detail view.
pub fn item_detail(item: &VaultItem, reveal: bool) -> String {
    let mut out = format!(
        "{} {}\n{} {}\n{} {}\n{} {}\n{} {}\n",
        "id:      ".dimmed(),
        item.id,
        "url:     ".dimmed(),
        item.url,
        "username:".dimmed(),
        item.username,
        "password:".dimmed(),
        password_text(item, reveal),
        "created: ".dimmed(),
        item.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    for field in &item.fields {
        let value = if reveal {
            field.value.clone()
        } else {
            mask_secret(&field.value, 0)
        };
        out.push_str(&format!("{} {value}\n", format!("{}:", field.name).dimmed()));
    }
    if let Some(note) = &item.note {
        out.push_str(&format!("{} {note}\n", "note:    ".dimmed()));
    }
    out
}

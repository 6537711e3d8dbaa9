// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyvault - a local, encrypted credential vault.
//!
//! This is the binary entry point. Every invocation opens the configured
//! database, resumes a mirrored session if one exists, and runs one command.

mod app;
mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use keyvault_core::{CustomField, VaultError};
use keyvault_vault::PasswordPolicy;

use crate::app::App;
use crate::commands::ItemArgs;

/// Keyvault - a local, encrypted credential vault.
#[derive(Parser, Debug)]
#[command(name = "keyvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account and unlock the new vault.
    Register {
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Unlock the vault with the master password.
    Login { username: String },
    /// Unlock the vault with a PIN.
    UnlockPin,
    /// Lock the vault and remove PIN unlock.
    Logout,
    /// Show whether the vault is unlocked.
    Status,
    /// Save a new credential.
    Add {
        url: String,
        username: String,
        #[command(flatten)]
        item: ItemFlags,
    },
    /// Change fields of a stored credential.
    Edit {
        id: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
        /// Remove the note.
        #[arg(long, conflicts_with = "note")]
        clear_note: bool,
        /// Remove every custom field.
        #[arg(long, conflicts_with = "fields")]
        clear_fields: bool,
        #[command(flatten)]
        item: ItemFlags,
    },
    /// List every stored credential.
    List {
        /// Print passwords in clear text.
        #[arg(long)]
        reveal: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one credential.
    Show {
        id: String,
        #[arg(long)]
        reveal: bool,
    },
    /// Find the credential for a site.
    Find {
        url: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        reveal: bool,
    },
    /// Delete a credential.
    Delete { id: String },
    /// Change the master password. Stored credentials are not re-encrypted.
    ChangePassword { username: String },
    /// Manage PIN unlock.
    Pin {
        #[command(subcommand)]
        action: PinCommand,
    },
    /// Print a random password.
    Generate {
        #[command(flatten)]
        policy: PolicyFlags,
    },
}

#[derive(Subcommand, Debug)]
enum PinCommand {
    /// Allow unlocking this vault with a PIN.
    Enable,
}

#[derive(Args, Debug)]
struct ItemFlags {
    #[arg(long)]
    note: Option<String>,
    /// Custom field as `name=value`. Repeatable.
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<CustomField>,
    /// Generate the password instead of prompting for it.
    #[arg(long)]
    generate: bool,
    #[command(flatten)]
    policy: PolicyFlags,
}

#[derive(Args, Debug, Clone, Copy)]
struct PolicyFlags {
    /// Generated password length.
    #[arg(long, default_value_t = 20)]
    length: usize,
    #[arg(long)]
    no_uppercase: bool,
    #[arg(long)]
    no_digits: bool,
    #[arg(long)]
    no_symbols: bool,
}

impl PolicyFlags {
    fn policy(self) -> PasswordPolicy {
        PasswordPolicy {
            length: self.length,
            uppercase: !self.no_uppercase,
            digits: !self.no_digits,
            symbols: !self.no_symbols,
        }
    }
}

impl ItemFlags {
    fn into_args(self, url: Option<String>, username: Option<String>, new_password: bool) -> ItemArgs {
        ItemArgs {
            url,
            username,
            note: self.note,
            fields: self.fields,
            generate: self.generate.then(|| self.policy.policy()),
            new_password,
            ..ItemArgs::default()
        }
    }
}

fn parse_field(raw: &str) -> Result<CustomField, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok(CustomField {
            name: name.trim().to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected `name=value`, got `{raw}`")),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.plain || !std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        colored::control::set_override(false);
    }

    let loaded = match &cli.config {
        Some(path) => keyvault_config::load_and_validate_path(path),
        None => keyvault_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            keyvault_config::render_errors(&errors);
            std::process::exit(2);
        }
    };
    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{} {e}", "error:".red());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: keyvault_config::KeyvaultConfig) -> Result<(), VaultError> {
    if let Commands::Generate { policy } = &command {
        return commands::generate(&policy.policy());
    }

    let app = App::open(config).await?;
    let service = &app.service;
    match command {
        Commands::Register { username, email } => commands::register(service, &username, &email).await,
        Commands::Login { username } => commands::login(service, &username).await,
        Commands::UnlockPin => commands::unlock_pin(service).await,
        Commands::Logout => commands::logout(service).await,
        Commands::Status => commands::status(&app).await,
        Commands::Add {
            url,
            username,
            item,
        } => commands::add(service, item.into_args(Some(url), Some(username), true)).await,
        Commands::Edit {
            id,
            url,
            username,
            password,
            clear_note,
            clear_fields,
            item,
        } => {
            let args = ItemArgs {
                clear_note,
                clear_fields,
                ..item.into_args(url, username, password)
            };
            commands::edit(service, &id, args).await
        }
        Commands::List { reveal, json } => commands::list(service, reveal, json).await,
        Commands::Show { id, reveal } => commands::show(service, &id, reveal).await,
        Commands::Find {
            url,
            username,
            reveal,
        } => commands::find(service, &url, username.as_deref(), reveal).await,
        Commands::Delete { id } => commands::delete(service, &id).await,
        Commands::ChangePassword { username } => commands::change_password(service, &username).await,
        Commands::Pin {
            action: PinCommand::Enable,
        } => commands::enable_pin(service).await,
        Commands::Generate { policy } => commands::generate(&policy.policy()),
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

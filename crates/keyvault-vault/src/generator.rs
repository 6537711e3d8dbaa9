// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation.

use keyvault_core::VaultError;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use secrecy::SecretString;

const LOWERCASE: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.?";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;

/// Which character classes a generated password draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 20,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl PasswordPolicy {
    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = vec![LOWERCASE];
        if self.uppercase {
            classes.push(UPPERCASE);
        }
        if self.digits {
            classes.push(DIGITS);
        }
        if self.symbols {
            classes.push(SYMBOLS);
        }
        classes
    }
}

/// Generate a password containing at least one character from every enabled
/// class. Look-alike characters (`0`, `O`, `1`, `l`, `I`) are excluded.
pub fn generate_password(policy: &PasswordPolicy) -> Result<SecretString, VaultError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&policy.length) {
        return Err(VaultError::Config(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {}",
            policy.length
        )));
    }

    let classes = policy.classes();
    let pool: Vec<u8> = classes.concat();
    let mut rng = OsRng;

    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    while chars.len() < policy.length {
        if let Some(&c) = pool.choose(&mut rng) {
            chars.push(c);
        }
    }
    chars.shuffle(&mut rng);

    let password = String::from_utf8(chars)
        .map_err(|e| VaultError::Internal(format!("generated password is not UTF-8: {e}")))?;
    Ok(SecretString::from(password))
}

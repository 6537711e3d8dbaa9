// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via TTY prompt or environment variable.

use keyvault_core::VaultError;
use secrecy::SecretString;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV_VAR: &str = "KEYVAULT_PASSWORD";

/// Environment variable consulted before prompting for the PIN.
pub const PIN_ENV_VAR: &str = "KEYVAULT_PIN";

/// Environment variable for the new password during `change-password`.
pub const NEW_PASSWORD_ENV_VAR: &str = "KEYVAULT_NEW_PASSWORD";

/// Environment variable for a credential's password when adding or editing.
pub const ITEM_PASSWORD_ENV_VAR: &str = "KEYVAULT_ITEM_PASSWORD";

/// Read a secret from `env_var`, or prompt for it on an interactive terminal.
///
/// Empty values are rejected from either source.
pub fn read_secret(env_var: &str, label: &str) -> Result<SecretString, VaultError> {
    if let Some(value) = from_env(env_var) {
        return Ok(value);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let value = prompt_line(label)?;
        if value.is_empty() {
            return Err(VaultError::Config(format!("empty {label} not allowed")));
        }
        return Ok(SecretString::from(value));
    }

    Err(no_input(env_var, label))
}

/// Like [`read_secret`], but a prompted value must be typed twice.
pub fn read_new_secret(env_var: &str, label: &str) -> Result<SecretString, VaultError> {
    if let Some(value) = from_env(env_var) {
        return Ok(value);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = prompt_line(&format!("new {label}"))?;
        let second = prompt_line(&format!("confirm {label}"))?;
        if first != second {
            return Err(VaultError::Config(format!("{label}s do not match")));
        }
        if first.is_empty() {
            return Err(VaultError::Config(format!("empty {label} not allowed")));
        }
        return Ok(SecretString::from(first));
    }

    Err(no_input(env_var, label))
}

fn from_env(env_var: &str) -> Option<SecretString> {
    std::env::var(env_var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn prompt_line(label: &str) -> Result<String, VaultError> {
    eprint!("{}: ", capitalize(label));
    rpassword::read_password()
        .map_err(|e| VaultError::Config(format!("failed to read {label}: {e}")))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn no_input(env_var: &str, label: &str) -> VaultError {
    VaultError::Config(format!(
        "no {label} provided. Set {env_var} or run interactively."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn secret_from_env_var() {
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "Str0ng_P@ss1") };
        let result = read_secret(PASSWORD_ENV_VAR, "master password");
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "Str0ng_P@ss1");
    }

    #[test]
    #[serial]
    fn new_secret_from_env_var_skips_confirmation() {
        unsafe { std::env::set_var(PIN_ENV_VAR, "1234") };
        let result = read_new_secret(PIN_ENV_VAR, "PIN");
        unsafe { std::env::remove_var(PIN_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "1234");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_rejected() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "") };
        // stdin is not a terminal under the test harness.
        let result = read_secret(PASSWORD_ENV_VAR, "master password");
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn labels_are_capitalized() {
        assert_eq!(capitalize("master password"), "Master password");
        assert_eq!(capitalize(""), "");
    }
}

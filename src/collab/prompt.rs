//! Interactive password and confirmation prompts.
//!
//! Shaped after the teacher's `ui::prompt::Prompt`, but built on `inquire`
//! (the dependency actually carried in this crate's manifest) rather than
//! `dialoguer`.

use inquire::{Confirm, Password, PasswordDisplayMode};
use secrecy::ExposeSecret;

use crate::config::PASSWORD_MIN_LENGTH;
use crate::secret::SecretBytes;

/// Centralizes every interactive prompt the CLI needs.
pub struct Prompt {
    password_min_length: usize,
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new(PASSWORD_MIN_LENGTH)
    }
}

impl Prompt {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }

    /// Prompts for a new password twice, returning an error on mismatch
    /// or on a too-short password.
    pub fn prompt_new_password(&self) -> anyhow::Result<SecretBytes> {
        let password = self.prompt_password("Enter password")?;
        let confirmation = self.prompt_password("Confirm password")?;
        if password.expose_secret() != confirmation.expose_secret() {
            anyhow::bail!("passwords do not match");
        }
        Ok(password)
    }

    /// Prompts for an existing password, once.
    pub fn prompt_existing_password(&self) -> anyhow::Result<SecretBytes> {
        self.prompt_password("Enter password")
    }

    fn prompt_password(&self, message: &str) -> anyhow::Result<SecretBytes> {
        let min_length = self.password_min_length;
        let entered = Password::new(message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_validator(move |input: &str| {
                if input.len() < min_length {
                    Ok(inquire::validator::Validation::Invalid(
                        format!("password must be at least {min_length} characters long").into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .without_confirmation()
            .prompt()?;
        Ok(SecretBytes::from_slice(entered.as_bytes()))
    }

    /// Asks a yes/no question, defaulting to `false` (the safe answer
    /// for anything destructive).
    pub fn confirm(&self, message: &str) -> anyhow::Result<bool> {
        Ok(Confirm::new(message).with_default(false).prompt()?)
    }
}

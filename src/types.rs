//! Common type definitions shared by the CLI and the vault engine.
//!
//! # Overview
//!
//! - [`VaultAction`]: Distinguishes the CLI subcommand in progress, for
//!   display and logging labels.

use std::fmt::{Display, Formatter, Result};

/// Which operation the CLI is carrying out against a vault file.
///
/// Used for user-facing output and log labels, the way the teacher's
/// `ProcessorMode` distinguished encrypt/decrypt runs.
#[derive(Clone, Copy, PartialEq)]
pub enum VaultAction {
    /// Inspecting a file's derived layout without touching any slot.
    Open,

    /// Locking a secret into the vault under a password.
    Write,

    /// Unlocking the secret stored under a password.
    Read,

    /// Overwriting every slot with fresh random data.
    Wipe,

    /// Filling a new file with random bytes so it can become a vault.
    Create,
}

impl VaultAction {
    /// Returns a human-readable label for the action.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Write => "Write",
            Self::Read => "Read",
            Self::Wipe => "Wipe",
            Self::Create => "Create",
        }
    }
}

impl Display for VaultAction {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

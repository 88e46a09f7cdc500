// HushVault - a password-locked secret vault whose file contents are
// indistinguishable from noise.
//
// Key derivation: Argon2d, seeded by the file's own head/tail salt
// Storage: AES-256-OFB stream encryption, replicated or Shamir-shared

mod cli;
mod collab;
mod config;
mod crypto;
mod primitives;
mod secret;
mod shamir;
mod types;
mod vault;
mod vba;

use std::process;

use cli::Cli;

/// Entry point for the HushVault CLI.
///
/// # Exit Codes
/// * 0 - Success
/// * 1 - Error (message printed to stderr)
fn main() {
    let result = Cli::init().and_then(Cli::execute);
    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}

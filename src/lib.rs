//! HushVault - a password-locked secret vault whose file contents are
//! indistinguishable from noise.
//!
//! A small, high-entropy payload is hidden inside an otherwise-ordinary
//! file using:
//! - Argon2d key derivation, seeded by the file's own head/tail salt
//! - AES-256-OFB stream encryption, one independent keystream per slot
//! - Shamir's Secret Sharing over a large prime field for redundant,
//!   threshold-recoverable storage
//! - A checksum envelope ([`vba::Vba`]) that tells a correct password
//!   apart from a wrong one without ever storing a header or magic bytes

pub mod cli;
pub mod collab;
pub mod config;
pub mod crypto;
pub mod primitives;
pub mod secret;
pub mod shamir;
pub mod types;
pub mod vault;
pub mod vba;

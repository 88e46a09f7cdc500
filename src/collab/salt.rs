//! Salt-file hashing.
//!
//! Grounded on `examples/original_source/slots.py::calc_salt`'s `seed`
//! parameter and `crypto.py::hash_files`: an optional extra file (or
//! device identifier) can be hashed in alongside the vault's own
//! head/tail salt, so two people who both guess the password still need
//! the same salt file to open the same data. Read synchronously, in one
//! pass, since salt files are expected to be small compared to the vault
//! itself.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha512};

use crate::vault::error::VaultError;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Hashes the contents of `path` with SHA-512, returning the digest to
/// mix into the vault's salt.
pub fn hash_salt_file(path: &Path) -> Result<[u8; 64], VaultError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    Ok(out)
}

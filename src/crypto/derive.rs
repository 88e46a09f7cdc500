//! Password hash derivation: SHA-512(password) run through Argon2d.
//!
//! Grounded on `examples/original_source/crypto.py::run_argon`: the
//! password is pre-hashed with SHA-512 so the Argon2 key input is fixed
//! width and the original password bytes can be dropped immediately, and
//! Argon2 runs in its `d` variant (`argon_type=0`), not `id`, per that
//! file's own comment that `id` is unnecessary here. The [`Derive`]
//! struct itself follows the shape of the teacher's `cipher::derive::Derive`.

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};

use crate::config::{ARGON_MEMORY, ARGON_MIN_BUFLEN, ARGON_THREADS, ARGON_TIME};
use crate::secret::SecretBytes;
use crate::vault::error::VaultError;

/// Combines a head salt, a tail salt, and an optional external salt
/// (e.g. a salt-file digest or a device serial) into the single digest
/// Argon2 is keyed with (spec.md §4.1 "Salt derivation").
pub fn salt_digest(head_salt: &[u8], tail_salt: &[u8], external: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(head_salt);
    hasher.update(tail_salt);
    hasher.update(external);
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// Runs Argon2d over `SHA-512(password)`, producing `buflen` bytes of
/// password hash (phash).
pub fn derive_phash(password: &SecretBytes, salt: &[u8], buflen: usize) -> Result<SecretBytes, VaultError> {
    let mut hasher = Sha512::new();
    hasher.update(password.expose_secret());
    let key_digest = hasher.finalize();

    let params = Params::new(ARGON_MEMORY, ARGON_TIME, ARGON_THREADS, Some(buflen.max(ARGON_MIN_BUFLEN)))
        .map_err(|e| VaultError::Configuration(format!("invalid argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2d, Version::V0x13, params);

    let mut phash = vec![0u8; buflen.max(ARGON_MIN_BUFLEN)];
    argon2
        .hash_password_into(&key_digest, salt, &mut phash)
        .map_err(|e| VaultError::Configuration(format!("argon2 derivation failed: {e}")))?;
    phash.truncate(buflen);
    Ok(SecretBytes::from_slice(&phash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_and_salt_give_same_phash() {
        let password = SecretBytes::from_slice(b"correct horse battery staple");
        let salt = salt_digest(b"head", b"tail", b"");
        let a = derive_phash(&password, &salt, 256).unwrap();
        let b = derive_phash(&password, &salt, 256).unwrap();
        assert_eq!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn different_salt_gives_different_phash() {
        let password = SecretBytes::from_slice(b"correct horse battery staple");
        let salt_a = salt_digest(b"head", b"tail", b"");
        let salt_b = salt_digest(b"head", b"tailtail", b"");
        let a = derive_phash(&password, &salt_a, 256).unwrap();
        let b = derive_phash(&password, &salt_b, 256).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn salt_digest_mixes_in_external_material() {
        let a = salt_digest(b"head", b"tail", b"");
        let b = salt_digest(b"head", b"tail", b"device-serial-123");
        assert_ne!(a, b);
    }
}

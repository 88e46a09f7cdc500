//! AES-256-OFB stream encryption.
//!
//! Grounded on `examples/original_source/crypto.py::encrypt_data` /
//! `decrypt_data` / `pad`: OFB mode, not an AEAD mode, since the vault's
//! own checksum (via [`crate::vba::Vba`]) already detects tampering and
//! OFB lets every slot be encrypted independently of its neighbors with
//! no chaining between slot writes.

use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher};
use ofb::Ofb;

use crate::config::{AES_IV_SIZE, AES_KEY_SIZE};
use crate::vault::error::VaultError;

type Aes256Ofb = Ofb<Aes256>;

/// Pads `data` up to the next 16-byte boundary with random bytes, the
/// way OFB mode requires a full final block even though the cipher only
/// ever outputs as many bytes as it's asked for.
fn pad(data: &[u8], random: &dyn crate::collab::random::RandomSource) -> Vec<u8> {
    let remainder = data.len() % 16;
    if remainder == 0 {
        return data.to_vec();
    }
    let mut out = data.to_vec();
    out.extend(random.bytes(16 - remainder));
    out
}

fn require_lengths(key: &[u8], iv: &[u8]) -> Result<(), VaultError> {
    if key.len() != AES_KEY_SIZE {
        return Err(VaultError::Configuration(format!("AES key must be {AES_KEY_SIZE} bytes, got {}", key.len())));
    }
    if iv.len() != AES_IV_SIZE {
        return Err(VaultError::Configuration(format!("AES IV must be {AES_IV_SIZE} bytes, got {}", iv.len())));
    }
    Ok(())
}

/// Encrypts `data` with `key`/`vector`, cropping the output back down to
/// `data`'s original length.
pub fn encrypt(data: &[u8], key: &[u8], vector: &[u8], random: &dyn crate::collab::random::RandomSource) -> Result<Vec<u8>, VaultError> {
    require_lengths(key, vector)?;
    let mut buf = pad(data, random);
    let mut cipher = Aes256Ofb::new(key.into(), vector.into());
    cipher.apply_keystream(&mut buf);
    buf.truncate(data.len());
    Ok(buf)
}

/// Decrypts `data` with `key`/`vector`. OFB is self-inverse, so this is
/// identical to [`encrypt`] except it never needs random padding.
pub fn decrypt(data: &[u8], key: &[u8], vector: &[u8]) -> Result<Vec<u8>, VaultError> {
    require_lengths(key, vector)?;
    let remainder = data.len() % 16;
    let mut buf = data.to_vec();
    if remainder != 0 {
        buf.extend(std::iter::repeat_n(0u8, 16 - remainder));
    }
    let mut cipher = Aes256Ofb::new(key.into(), vector.into());
    cipher.apply_keystream(&mut buf);
    buf.truncate(data.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::random::OsRandomSource;

    #[test]
    fn roundtrips() {
        let key = [7u8; AES_KEY_SIZE];
        let iv = [3u8; AES_IV_SIZE];
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let ciphertext = encrypt(plaintext, &key, &iv, &OsRandomSource).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        let recovered = decrypt(&ciphertext, &key, &iv).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn rejects_bad_key_length() {
        let iv = [0u8; AES_IV_SIZE];
        assert!(encrypt(b"x", &[0u8; 10], &iv, &OsRandomSource).is_err());
    }

    #[test]
    fn different_iv_gives_different_ciphertext() {
        let key = [1u8; AES_KEY_SIZE];
        let iv_a = [2u8; AES_IV_SIZE];
        let iv_b = [9u8; AES_IV_SIZE];
        let plaintext = b"same plaintext, different stream";
        let a = encrypt(plaintext, &key, &iv_a, &OsRandomSource).unwrap();
        let b = encrypt(plaintext, &key, &iv_b, &OsRandomSource).unwrap();
        assert_ne!(a, b);
    }
}

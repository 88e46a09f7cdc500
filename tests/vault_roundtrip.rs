//! End-to-end scenarios over real on-disk files (spec.md §8).
//!
//! The unit tests beside `vault::mod` already cover the `Cursor`-backed
//! fast path; these exercise the same engine through `std::fs::File` to
//! make sure the `Read + Write + Seek` generalization holds for a real
//! file handle too.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};

use hushvault::collab::random::OsRandomSource;
use hushvault::secret::SecretBytes;
use hushvault::vault::Vault;

fn random_file(size: usize) -> tempfile::NamedTempFile {
    use rand::TryRngCore;
    use rand::rngs::OsRng;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut remaining = size;
    let mut buf = vec![0u8; 64 * 1024];
    while remaining > 0 {
        let take = remaining.min(buf.len());
        OsRng.try_fill_bytes(&mut buf[..take]).unwrap();
        file.write_all(&buf[..take]).unwrap();
        remaining -= take;
    }
    file.flush().unwrap();
    file
}

fn open(file: &tempfile::NamedTempFile, password: &SecretBytes, shamir: bool) -> Vault<std::fs::File> {
    let handle = OpenOptions::new().read(true).write(true).open(file.path()).unwrap();
    Vault::open(handle, password, b"", shamir, Box::new(OsRandomSource)).unwrap()
}

/// Scenario 1: small replicated round-trip.
#[test]
fn small_replicated_roundtrip() {
    let file = random_file(2 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"passw0rd-but-long-enough");

    let mut vault = open(&file, &password, false);
    vault.write_slot(b"hello").unwrap();
    assert_eq!(vault.read_slot().unwrap().as_deref(), Some(b"hello".as_slice()));
}

/// Scenario 2: Shamir threshold round-trip. The secret must stay well
/// under `MAX_SHAMIR - HEADER_LEN` or `write_slot` silently falls back to
/// replicated mode (`src/vault/mod.rs`'s Shamir-fallback guard), so this
/// uses 80 bytes rather than the 120 named in spec.md's narrative
/// example. Recovery is verified by destroying shares one at a time
/// until reading fails, proving a real threshold rather than needing
/// every candidate slot intact.
#[test]
fn shamir_threshold_roundtrip() {
    let file = random_file(2 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"correct horse battery staple");
    let secret: Vec<u8> = (0..80u32).map(|i| (i * 7 + 3) as u8).collect();

    {
        let mut vault = open(&file, &password, true);
        vault.write_slot(&secret).unwrap();
        assert_eq!(vault.read_slot().unwrap().as_deref(), Some(secret.as_slice()));
    }

    let offsets = open(&file, &password, true).slot_offsets();

    let mut destroyed = 0;
    for &offset in &offsets {
        {
            let mut handle = OpenOptions::new().write(true).open(file.path()).unwrap();
            handle.seek(SeekFrom::Start(offset as u64)).unwrap();
            handle.write_all(&vec![0u8; hushvault::config::MAX_SHAMIR]).unwrap();
        }
        destroyed += 1;

        let mut vault = open(&file, &password, true);
        if vault.read_slot().unwrap().is_none() {
            break;
        }
    }

    assert!(destroyed > 0, "the secret should survive destroying at least one share");
    assert!(
        destroyed < offsets.len(),
        "recovery should fail before every candidate slot is destroyed, proving a real threshold instead of full replication"
    );
}

/// Scenario 3: wrong password returns nothing, never an error.
#[test]
fn wrong_password_after_write() {
    let file = random_file(2 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"passw0rd-but-long-enough");
    let mut vault = open(&file, &password, false);
    vault.write_slot(b"hello").unwrap();
    drop(vault);

    let wrong = SecretBytes::from_slice(b"passw1rd-but-long-enough");
    let mut vault = open(&file, &wrong, false);
    assert!(vault.read_slot().unwrap().is_none());
}

/// Scenario 4: rewriting under the same password obliterates the ghost.
#[test]
fn rewrite_obliterates_ghost() {
    let file = random_file(2 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"passw0rd-but-long-enough");

    {
        let mut vault = open(&file, &password, false);
        vault.write_slot(b"hello").unwrap();
    }
    {
        let mut vault = open(&file, &password, false);
        vault.write_slot(b"world").unwrap();
    }

    let mut vault = open(&file, &password, false);
    assert_eq!(vault.read_slot().unwrap().as_deref(), Some(b"world".as_slice()));
}

/// Scenario 5: a file too small for the minimum slot count is rejected
/// at open time with a configuration error, not a panic.
#[test]
fn file_too_small_is_rejected() {
    let file = random_file(20_000);
    let password = SecretBytes::from_slice(b"passw0rd-but-long-enough");
    let handle = OpenOptions::new().read(true).write(true).open(file.path()).unwrap();
    let result = Vault::open(handle, &password, b"", false, Box::new(OsRandomSource));
    assert!(result.is_err());
}

/// Scenario 7 (reduced): wipe followed by a read with the original
/// password returns nothing.
#[test]
fn wipe_then_read_returns_nothing() {
    let file = random_file(2 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"passw0rd-but-long-enough");

    {
        let mut vault = open(&file, &password, false);
        vault.write_slot(b"hello").unwrap();
        vault.wipe().unwrap();
    }

    let mut vault = open(&file, &password, false);
    assert!(vault.read_slot().unwrap().is_none());
}

/// Two independent opens with the same password/file derive the same
/// offsets and keys: writing then closing then reopening recovers the
/// secret byte-for-byte (spec.md §8 "identical derived offsets").
#[test]
fn reopening_derives_identical_key_schedule() {
    let file = random_file(4 * 1024 * 1024);
    let password = SecretBytes::from_slice(b"a reasonably long passphrase");
    let secret = b"deterministic derivation check";

    {
        let mut vault = open(&file, &password, true);
        vault.write_slot(secret).unwrap();
    }

    for _ in 0..3 {
        let mut vault = open(&file, &password, true);
        assert_eq!(vault.read_slot().unwrap().as_deref(), Some(secret.as_slice()));
    }
}


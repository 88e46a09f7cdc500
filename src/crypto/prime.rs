//! Deterministic prime generation from a 192-byte phash reservation.
//!
//! Grounded on `examples/original_source/crypto.py::get_prime`: the seed
//! splits into a 32-byte AES key, a 16-byte IV, a 16-byte unused gap, and
//! a root plaintext (the remaining 128 bytes); the root is encrypted in
//! AES-OFB mode repeatedly to produce a deterministic pseudorandom
//! keystream, which is fed into a prime search. Every vault opened with
//! the same password and salt gets back the same Shamir prime.

use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use ofb::Ofb;

use crate::config::{AES_IV_SIZE, AES_KEY_SIZE, MAX_PRIME_PAD_TRIES};
use crate::vault::error::VaultError;

type Aes256Ofb = Ofb<Aes256>;

const SEED_LEN: usize = 192;
const GAP_LEN: usize = 16;
const ROOT_OFFSET: usize = AES_KEY_SIZE + AES_IV_SIZE + GAP_LEN;

/// Small primes used to sieve obviously-composite candidates before
/// running the (expensive) Miller-Rabin test.
const SMALL_PRIMES: &[u32] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

fn chunk_up(len: usize, to: usize) -> usize {
    len.div_ceil(to) * to
}

/// Rounds `root` up to at least `length` bytes by repeating it, the way
/// `get_prime` does when the 128-byte root is shorter than the requested
/// prime length.
fn expand_root(root: &[u8], length: usize) -> Vec<u8> {
    if root.len() >= length {
        return root.to_vec();
    }
    let crop = chunk_up(length, 64);
    root.iter().copied().cycle().take(crop).collect()
}

/// Deterministic Miller-Rabin primality test with a fixed witness set;
/// "deterministic" here means reproducible, not rigorously proven for
/// arbitrary bit lengths, matching the dependency-free approach of the
/// original Python (which relies on PyCryptodome's internal test).
fn is_probable_prime(n: &BigUint) -> bool {
    if n < &BigUint::from(2u32) {
        return false;
    }
    for &p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let two = &one + &one;
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while (&d % &two).is_zero() {
        d /= &two;
        r += 1;
    }

    'witness: for &a in SMALL_PRIMES {
        let a = BigUint::from(a);
        if a >= *n {
            continue;
        }
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generates a `length`-byte prime deterministically from a 192-byte
/// phash reservation (spec.md §4.1, "Prime generation").
pub fn generate_prime(seed: &[u8], length: usize) -> Result<BigUint, VaultError> {
    if seed.len() != SEED_LEN {
        return Err(VaultError::Configuration(format!("prime seed must be {SEED_LEN} bytes, got {}", seed.len())));
    }
    let key = &seed[..AES_KEY_SIZE];
    let iv = &seed[AES_KEY_SIZE..AES_KEY_SIZE + AES_IV_SIZE];
    let root = expand_root(&seed[ROOT_OFFSET..], length);

    let mut cipher = Aes256Ofb::new(key.into(), iv.into());
    let mut candidate_bytes = vec![0u8; length];

    for _ in 0..MAX_PRIME_PAD_TRIES {
        let mut block = root.clone();
        cipher.apply_keystream(&mut block);
        candidate_bytes.copy_from_slice(&block[..length]);
        candidate_bytes[length - 1] |= 0x80;
        candidate_bytes[0] |= 1;

        let mut candidate = BigUint::from_bytes_le(&candidate_bytes);
        for _ in 0..MAX_PRIME_PAD_TRIES {
            if is_probable_prime(&candidate) {
                return Ok(candidate);
            }
            candidate += 2u32;
        }
    }
    Err(VaultError::LayoutSearch(format!("no {length}-byte prime found within search budget")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_byte(fill: u8) -> Vec<u8> {
        let mut seed = vec![fill; SEED_LEN];
        // Give the root some structure so it isn't degenerate under OFB.
        for (i, b) in seed[ROOT_OFFSET..].iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(31).wrapping_add(fill);
        }
        seed
    }

    #[test]
    fn is_deterministic() {
        let seed = seed_from_byte(42);
        let a = generate_prime(&seed, 32).unwrap();
        let b = generate_prime(&seed, 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn result_is_actually_prime() {
        let seed = seed_from_byte(7);
        let prime = generate_prime(&seed, 16).unwrap();
        assert!(is_probable_prime(&prime));
    }

    #[test]
    fn different_seeds_give_different_primes() {
        let a = generate_prime(&seed_from_byte(1), 24).unwrap();
        let b = generate_prime(&seed_from_byte(2), 24).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn small_primes_are_recognized() {
        assert!(is_probable_prime(&BigUint::from(2u32)));
        assert!(is_probable_prime(&BigUint::from(97u32)));
        assert!(!is_probable_prime(&BigUint::from(91u32)));
        assert!(!is_probable_prime(&BigUint::from(1u32)));
    }

    #[test]
    fn rejects_wrong_seed_length() {
        assert!(generate_prime(&[0u8; 10], 16).is_err());
    }
}

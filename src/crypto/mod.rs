//! Password hashing, stream encryption, and deterministic prime
//! generation — the cryptographic primitives the vault engine composes.
//!
//! Grounded on `examples/original_source/crypto.py`, generalized from the
//! teacher's `cipher` module's shape (key derivation struct, dedicated
//! submodule per concern).

pub mod derive;
pub mod prime;
pub mod stream;

pub use derive::{derive_phash, salt_digest};
pub use prime::generate_prime;

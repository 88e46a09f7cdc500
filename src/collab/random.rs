//! Random byte source abstraction.
//!
//! A trait seam so the engine never calls `OsRng` directly, mirroring the
//! collaborator interfaces in `examples/original_source/crypto.py::get_random`
//! (which sources from a mouse-entropy hasher when available, falling back
//! to `os.urandom`). Only the `os.urandom` fallback is implemented here;
//! the mouse-entropy collaborator is out of scope (spec.md Non-goals).

use rand::TryRngCore;
use rand::rngs::OsRng;

/// Anything that can hand back cryptographically secure random bytes.
pub trait RandomSource {
    fn bytes(&self, len: usize) -> Vec<u8>;
}

/// The default source: the operating system's CSPRNG.
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        OsRng.try_fill_bytes(&mut buf).expect("OS RNG failure");
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_length() {
        let random = OsRandomSource;
        assert_eq!(random.bytes(32).len(), 32);
        assert_eq!(random.bytes(0).len(), 0);
    }

    #[test]
    fn two_draws_differ() {
        let random = OsRandomSource;
        assert_ne!(random.bytes(32), random.bytes(32));
    }
}

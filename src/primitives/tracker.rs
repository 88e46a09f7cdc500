//! Hash tracker: reserves non-overlapping slices of the password hash.
//!
//! Grounded on `examples/original_source/bitfun.py::ByteTracker` and its
//! use in `slots.py::KeyLocker.set_phash`. The tracker never copies the
//! phash, only records `(offset, length)` pairs (spec.md §9, "Tracker as
//! pointer bag"); callers slice the owning buffer through
//! [`Reservation::get`]/[`Reservation::get_one`].

use crate::vault::error::VaultError;

/// A single `(offset, length)` reservation, or a contiguous run of `n`
/// equal-length reservations.
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    offset: usize,
    len: usize,
    count: usize,
}

impl Reservation {
    /// Slice for the `i`th reservation in this run.
    pub fn get<'a>(&self, phash: &'a [u8], i: usize) -> &'a [u8] {
        assert!(i < self.count, "reservation index out of range");
        let start = self.offset + i * self.len;
        &phash[start..start + self.len]
    }

    /// Slice for a single-element reservation.
    pub fn get_one<'a>(&self, phash: &'a [u8]) -> &'a [u8] {
        self.get(phash, 0)
    }

    pub fn end(&self) -> usize {
        self.offset + self.len * self.count
    }
}

/// Reserves contiguous, disjoint slices of a hash buffer in a fixed,
/// deterministic order.
pub struct HashTracker {
    hash_len: usize,
    ptr: usize,
}

impl HashTracker {
    pub fn new(hash_len: usize) -> Self {
        Self { hash_len, ptr: 0 }
    }

    /// Reserves `count` contiguous slots of `len` bytes each.
    pub fn reserve(&mut self, len: usize, count: usize) -> Result<Reservation, VaultError> {
        let offset = self.ptr;
        let end = offset + len * count;
        if end > self.hash_len {
            return Err(VaultError::Configuration(format!(
                "phash exhausted: requested up to byte {end}, have {}",
                self.hash_len
            )));
        }
        self.ptr = end;
        Ok(Reservation { offset, len, count })
    }
}

/// Every derived-quantity reservation for one password hash, in the
/// fixed order required for an existing file to remain readable after a
/// rewrite (spec.md §4.2).
pub struct Reservations {
    pub shamir_key: Reservation,
    pub key: Reservation,
    pub shamir_vector: Reservation,
    pub vector: Reservation,
    pub prime_seed: Reservation,
    pub offset: Reservation,
}

impl Reservations {
    pub fn new(hash_len: usize, slot_max: usize) -> Result<Self, VaultError> {
        let mut tracker = HashTracker::new(hash_len);
        let shamir_key = tracker.reserve(32, 1)?;
        let key = tracker.reserve(32, slot_max)?;
        let shamir_vector = tracker.reserve(16, 1)?;
        let vector = tracker.reserve(16, slot_max)?;
        let prime_seed = tracker.reserve(192, 1)?;
        let offset = tracker.reserve(16, slot_max)?;
        Ok(Self { shamir_key, key, shamir_vector, vector, prime_seed, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_and_in_order() {
        let mut tracker = HashTracker::new(256);
        let a = tracker.reserve(32, 1).unwrap();
        let b = tracker.reserve(16, 2).unwrap();
        assert_eq!(a.end(), 32);
        assert_eq!(b.offset, 32);
        assert_eq!(b.end(), 64);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut tracker = HashTracker::new(10);
        assert!(tracker.reserve(32, 1).is_err());
    }

    #[test]
    fn full_reservation_fits_in_min_buflen() {
        // slot_max = 9 (slot_target=4 -> 2*4+1); must fit comfortably
        // within ARGON_MIN_BUFLEN.
        let reservations = Reservations::new(crate::config::ARGON_MIN_BUFLEN, 9).unwrap();
        assert!(reservations.offset.end() <= crate::config::ARGON_MIN_BUFLEN);
    }

    #[test]
    fn reservation_order_matches_keylocker() {
        let reservations = Reservations::new(crate::config::ARGON_MIN_BUFLEN, 9).unwrap();
        assert_eq!(reservations.shamir_key.end(), 32);
        assert_eq!(reservations.key.end(), 32 + 32 * 9);
        assert_eq!(reservations.shamir_vector.end(), reservations.key.end() + 16);
        assert_eq!(reservations.vector.end(), reservations.shamir_vector.end() + 16 * 9);
        assert_eq!(reservations.prime_seed.end(), reservations.vector.end() + 192);
        assert_eq!(reservations.offset.end(), reservations.prime_seed.end() + 16 * 9);
    }
}

//! File layout derivation (spec.md §4.1).
//!
//! Grounded on `examples/original_source/slots.py::KeyLocker.set_boundaries`
//! / `calc_salt_size` / `get_slot_count`. The file is divided into a head
//! salt, a slot area, optional free storage, and a tail salt of the same
//! length as the head.

use rand_distr::{Distribution, LogNormal};

use crate::config::{MAX_AREA, MAX_LEN, MAX_SALT_LEN, MIN_SLOTS, SALT_ROUND_THRESHOLD, SLOT_LEN};
use crate::vault::error::VaultError;

/// The geometry of a vault file, derived purely from its size.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub salt_len: usize,
    pub area: usize,
    pub storage: usize,
    pub num_slots: usize,
    pub slot_target: usize,
    pub slot_max: usize,
    pub max_reqs: usize,
    pub shamir_mode: bool,
}

/// Rounds `value` to the nearest multiple of `to`.
fn round_to_nearest(value: usize, to: usize) -> usize {
    ((value + to / 2) / to) * to
}

/// Salt length on each side of the file, biased towards a larger
/// percentage for smaller files (spec.md §4.1 "Salt length").
fn calc_salt_size(filesize: u64) -> usize {
    let digit_count = filesize.to_string().len().max(1);
    let divisor = (8 * digit_count) as u64;
    let mut salt = (filesize / divisor) as usize;
    if salt > MAX_SALT_LEN {
        salt = MAX_SALT_LEN;
    }
    if salt > SALT_ROUND_THRESHOLD {
        round_to_nearest(salt, 4096)
    } else {
        salt
    }
}

impl Layout {
    /// Derives the layout for a file of `filesize` bytes, requesting
    /// Shamir mode when `want_shamir` is set (it may still be disabled if
    /// the file is too small).
    pub fn derive(filesize: u64, want_shamir: bool) -> Result<Self, VaultError> {
        let salt_len = calc_salt_size(filesize);
        let not_salt = filesize.saturating_sub(salt_len as u64 * 2);

        let mut shamir_mode = want_shamir;
        let area = if not_salt >= MAX_AREA as u64 * 2 {
            MAX_AREA
        } else if not_salt >= MAX_AREA as u64 / 5 {
            (not_salt / 2) as usize
        } else {
            shamir_mode = false;
            not_salt as usize
        };

        let storage = filesize.saturating_sub(salt_len as u64 * 2).saturating_sub(area as u64) as usize;

        if salt_len as u64 * 2 + area as u64 + storage as u64 != filesize {
            return Err(VaultError::Configuration("layout arithmetic does not sum to file size".to_owned()));
        }

        let num_slots = area.saturating_sub(MAX_LEN) / SLOT_LEN;
        if num_slots < MIN_SLOTS {
            return Err(VaultError::Configuration(format!(
                "not enough slots available: file offers {num_slots}, need at least {MIN_SLOTS}"
            )));
        }
        if num_slots * SLOT_LEN + (MAX_LEN - SLOT_LEN) > area {
            return Err(VaultError::Configuration("slot area miscalculation".to_owned()));
        }

        let slot_target = if area >= MAX_AREA { 4 } else { 8 };
        let slot_max = slot_target * 2 + 1;
        let max_reqs = crate::config::MAX_REQS.min(slot_max.saturating_sub(slot_target)).max(1);

        Ok(Self { salt_len, area, storage, num_slots, slot_target, slot_max, max_reqs, shamir_mode })
    }

    /// Chooses how many slots to actually fill, centered on `self.slot_target`
    /// via a log-normal draw, biased towards the target and bounded by
    /// `slot_max - 1` (spec.md §4.5).
    pub fn slot_count(&self, random: &dyn crate::collab::random::RandomSource) -> usize {
        self.slot_count_inner(self.slot_target, 0.5, random, 0)
    }

    fn slot_count_inner(&self, target: usize, sigma: f64, random: &dyn crate::collab::random::RandomSource, depth: u32) -> usize {
        let unit = || -> f64 {
            let raw = random.bytes(8);
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&raw);
            (u64::from_le_bytes(buf) as f64) / (u64::MAX as f64)
        };

        if unit() < 0.2 {
            return target;
        }
        if target > 6 && unit() < 0.1 {
            let range = self.slot_max.saturating_sub(1).max(1);
            let raw = random.bytes(8);
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&raw);
            return 1 + (u64::from_le_bytes(buf) as usize % range);
        }

        let normal = LogNormal::new(0.0, sigma).expect("valid log-normal parameters");
        let raw = random.bytes(8);
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&raw);
        let u = ((u64::from_le_bytes(buf) as f64) / (u64::MAX as f64)).clamp(1e-12, 1.0 - 1e-12);
        let mut value = normal.inverse_cdf(u) * target as f64;

        if value < target as f64 {
            value *= 3.0;
        }
        if value > self.slot_max as f64 {
            if depth > 32 {
                return self.slot_max - 1;
            }
            return self.slot_count_inner(target, sigma, random, depth + 1);
        }
        if value < 1.0 {
            return 1;
        }
        value as usize
    }
}

//! VBA: the Validated Byte Array envelope.
//!
//! Layout: `checksum(8) | length(1) | payload(length) | padding`.
//! Grounded on `examples/original_source/bitfun.py::ABA`; this crate keeps
//! the acronym's meaning ("checksum, length, payload, padding") but
//! renames it to match the spec's own terminology.

use sha2::{Digest, Sha512};

use crate::vault::error::VaultError;

/// Checksum length in bytes: 8 (64 bits), chosen for ~2^-64 false-match
/// resistance (spec.md §4.3).
pub const CHK_LEN: usize = 8;

/// Header length: checksum + one length byte.
pub const HEADER_LEN: usize = CHK_LEN + 1;

/// A fixed-capacity mutable byte buffer carrying a checksum, a length
/// byte, a payload, and random padding.
pub struct Vba {
    buf: Vec<u8>,
    /// End of the payload region (exclusive), i.e. `HEADER_LEN + len`.
    end: usize,
    seed: Vec<u8>,
}

impl Vba {
    /// Rounds `len` up to the next multiple of `to`.
    fn chunk_up(len: usize, to: usize) -> usize {
        len.div_ceil(to) * to
    }

    /// Builds a new VBA wrapping `payload`, with capacity at least
    /// `capacity` bytes (rounded up to a multiple of `capacity` itself
    /// if the payload would overflow it — mirroring `ABA.__init__`'s
    /// `chunk_up(len(src) + header, size)`).
    pub fn new(payload: &[u8], capacity: usize, seed: &[u8]) -> Result<Self, VaultError> {
        if payload.len() > crate::config::MAX_PAYLOAD {
            return Err(VaultError::Configuration(format!(
                "payload length {} exceeds maximum {}",
                payload.len(),
                crate::config::MAX_PAYLOAD
            )));
        }
        let mut capacity = capacity;
        if payload.len() + HEADER_LEN > capacity {
            capacity = Self::chunk_up(payload.len() + HEADER_LEN, capacity);
        }
        if capacity - HEADER_LEN > 255 {
            return Err(VaultError::Configuration(format!(
                "capacity {capacity} implies a payload region over 255 bytes"
            )));
        }
        let mut vba = Self { buf: vec![0u8; capacity], end: HEADER_LEN, seed: seed.to_vec() };
        vba.read_into(payload);
        Ok(vba)
    }

    /// Wraps an already-decrypted raw buffer (e.g. fresh off a trial
    /// decrypt) without writing a header — `validate()` is what proves
    /// or disproves its contents.
    pub fn from_raw(buf: Vec<u8>) -> Self {
        let end = buf.len().min(HEADER_LEN);
        Self { buf, end, seed: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.end - HEADER_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Appends `src` after the current payload end, then updates the
    /// length byte and recomputes the checksum.
    pub fn read_into(&mut self, src: &[u8]) {
        let start = self.end;
        self.buf[start..start + src.len()].copy_from_slice(src);
        self.end += src.len();
        self.prepend_header();
    }

    fn payload(&self) -> &[u8] {
        &self.buf[HEADER_LEN..self.end]
    }

    fn checksum(&self) -> [u8; CHK_LEN] {
        let mut hasher = Sha512::new();
        if !self.seed.is_empty() {
            hasher.update(&self.seed);
        }
        hasher.update(self.payload());
        let digest = hasher.finalize();
        let mut out = [0u8; CHK_LEN];
        out.copy_from_slice(&digest[..CHK_LEN]);
        out
    }

    fn prepend_header(&mut self) {
        let len = self.len() as u8;
        let checksum = self.checksum();
        self.buf[..CHK_LEN].copy_from_slice(&checksum);
        self.buf[CHK_LEN] = len;
    }

    /// Guarantees the data-end is *not* a multiple of 64 by extending
    /// the buffer by 64 zero bytes if it is. Used only in Shamir mode
    /// (spec.md §4.8 step 1) to guarantee the prime can strictly exceed
    /// the encoded secret; see `examples/original_source/slots.py`'s
    /// `if not data.end % 64: data.arr += b'0'*64`.
    pub fn ensure_headroom(&mut self) {
        if self.end % 64 == 0 {
            self.buf.extend(std::iter::repeat_n(b'0', 64));
            self.prepend_header();
        }
    }

    /// Overwrites the padding region (from payload end to capacity)
    /// with `src`, or with freshly sampled random bytes if `src` is
    /// `None`. Never touches the header or payload.
    pub fn scramble(&mut self, src: Option<&[u8]>, random: &dyn crate::collab::random::RandomSource) {
        let pad_len = self.buf.len() - self.end;
        let owned;
        let fill: &[u8] = match src {
            Some(s) => {
                owned = s[..pad_len.min(s.len())].to_vec();
                &owned
            }
            None => {
                owned = random.bytes(pad_len);
                &owned
            }
        };
        self.buf[self.end..self.end + fill.len()].copy_from_slice(fill);
    }

    /// Reads the length byte, bounds-checks it, recomputes the checksum
    /// under the stored seed, and compares. Leaves `self` unchanged on
    /// failure (including `end`, which is restored).
    pub fn validate(&mut self) -> bool {
        if self.buf.len() < HEADER_LEN {
            return false;
        }
        let len = self.buf[CHK_LEN] as usize;
        let end = HEADER_LEN + len;
        if end > self.buf.len() {
            return false;
        }
        let old_end = self.end;
        self.end = end;
        let ok = self.checksum() == self.buf[..CHK_LEN];
        if !ok {
            self.end = old_end;
        }
        ok
    }

    /// The full buffer including header, for encryption or raw storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The payload only (post-header, pre-padding).
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload()
    }

    /// Overwrites every byte with random data before the buffer is
    /// dropped.
    pub fn destroy(mut self, random: &dyn crate::collab::random::RandomSource) {
        for _ in 0..crate::config::WIPE_PASSES {
            let fresh = random.bytes(self.buf.len());
            self.buf.copy_from_slice(&fresh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::random::{OsRandomSource, RandomSource};

    #[test]
    fn roundtrips_a_short_payload() {
        let vba = Vba::new(b"hello", 64, &[]).unwrap();
        assert_eq!(vba.payload_bytes(), b"hello");
        assert_eq!(vba.capacity(), 64);
    }

    #[test]
    fn validate_succeeds_after_transplant() {
        let random = OsRandomSource;
        let mut vba = Vba::new(b"secret data", 64, &[]).unwrap();
        vba.scramble(None, &random);
        let raw = vba.as_bytes().to_vec();

        let mut reread = Vba::from_raw(raw);
        assert!(reread.validate());
        assert_eq!(reread.payload_bytes(), b"secret data");
    }

    #[test]
    fn validate_fails_on_corruption() {
        let mut vba = Vba::new(b"secret data", 64, &[]).unwrap();
        vba.scramble(None, &OsRandomSource);
        let mut raw = vba.as_bytes().to_vec();
        raw[0] ^= 0xff;
        let mut reread = Vba::from_raw(raw);
        assert!(!reread.validate());
    }

    #[test]
    fn capacity_grows_to_fit_long_payload() {
        let payload = vec![7u8; 100];
        let vba = Vba::new(&payload, 64, &[]).unwrap();
        assert!(vba.capacity() >= 100 + HEADER_LEN);
        assert_eq!(vba.capacity() % 64, 0);
    }

    #[test]
    fn ensure_headroom_extends_on_exact_multiple() {
        // header(9) + payload(55) = 64, a multiple of 64.
        let payload = vec![1u8; 55];
        let mut vba = Vba::new(&payload, 64, &[]).unwrap();
        assert_eq!(vba.end, 64);
        vba.ensure_headroom();
        assert_eq!(vba.capacity(), 128);
        assert_eq!(vba.end, 64);
    }

    #[test]
    fn rejects_oversize_payload() {
        let payload = vec![0u8; 256];
        assert!(Vba::new(&payload, 64, &[]).is_err());
    }
}

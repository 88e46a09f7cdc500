//! Byte-packing and hash-reservation primitives shared by the rest of the
//! vault engine.
//!
//! Grounded on `examples/original_source/bitfun.py`: `to_bytes`/`from_bytes`,
//! the bit packer, the cipher-mode dictionary compressor, and the
//! `ByteTracker` all have a direct counterpart here.

pub mod bits;
pub mod bytes;
pub mod ciphermode;
pub mod tracker;

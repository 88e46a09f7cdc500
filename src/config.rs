//! Application configuration and cryptographic constants.
//!
//! Centralizes every constant the layout derivation, tracker, and Shamir
//! engine depend on, so the on-disk format has one source of truth.

/// The application name used in user-facing output and prompts.
pub const APP_NAME: &str = "HushVault";

/// Argon2d time cost (number of passes).
pub const ARGON_TIME: u32 = 3;

/// Argon2d memory cost in KiB.
pub const ARGON_MEMORY: u32 = 256 * 1024;

/// Argon2d parallelism factor (number of threads).
pub const ARGON_THREADS: u32 = 4;

/// Minimum length of the password hash (phash) buffer in bytes.
///
/// Must be large enough that [`crate::primitives::tracker::HashTracker`]
/// can reserve every section in spec §3 without overflowing.
pub const ARGON_MIN_BUFLEN: usize = 8192;

/// Minimum required password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Bytes per slot in the slot area. Overruns are allowed (`MAX_LEN`) but
/// every offset candidate is spaced at this stride.
pub const SLOT_LEN: usize = 64;

/// Maximum bytes ever read back from a single slot offset.
///
/// Larger than `2 * SLOT_LEN` only in the dead 256-byte path described in
/// `spec.md` §9; this crate never writes past `2 * SLOT_LEN` and always
/// reads exactly `MAX_LEN` bytes so replicated and Shamir trial reads
/// share one fixed-size buffer.
pub const MAX_LEN: usize = 256;

/// Shamir share width: twice a normal slot.
pub const MAX_SHAMIR: usize = SLOT_LEN * 2;

/// Maximum payload length a [`crate::vba::Vba`] can carry (length byte is
/// one byte wide).
pub const MAX_PAYLOAD: usize = 255;

/// Limit on the head/tail salt length before rounding to a sector
/// boundary kicks in.
pub const SALT_ROUND_THRESHOLD: usize = 4096 * 4;

/// Ceiling on the head/tail salt length regardless of file size.
pub const MAX_SALT_LEN: usize = 10 * 1024 * 1024;

/// Size of the slot area once the file is large enough to not be
/// storage-starved.
pub const MAX_AREA: usize = 1024 * 1024;

/// Minimum number of slots a file must offer, or it is rejected.
pub const MIN_SLOTS: usize = 10;

/// Maximum Shamir reconstruction threshold `k`.
pub const MAX_REQS: usize = 4;

/// Number of dummy Shamir interpolation passes run after a successful
/// recovery, to equalize timing against the no-match case (spec.md
/// §4.9).
pub const DUMMY_SHAMIR_PASSES: usize = 99;

/// Combination budget for each dummy interpolation pass: abandon the
/// search after this many tried combinations, matching the `giveup=99`
/// bound `examples/original_source/slots.py::read_shamir` uses for its
/// own timing-equalizer calls.
pub const DUMMY_SHAMIR_GIVEUP: usize = 99;

/// Number of consecutive bad-password read attempts before
/// `wipe_on_max_tries` (if enabled) destroys the file.
pub const DEFAULT_PASSWORD_TRIES: u32 = 15;

/// Exponential backoff base (seconds) between failed read attempts:
/// `BACKOFF_BASE.powi(try)`.
pub const BACKOFF_BASE: f64 = 1.2;

/// Number of wipe passes over the file.
pub const WIPE_PASSES: usize = 3;

/// Maximum tries for the Shamir offset non-overlap search (spec §4.8
/// step 6).
pub const MAX_OFFSET_SEARCH_TRIES: usize = 100_000;

/// Maximum tries for the Shamir prime-attitude-adjustment rejection loop
/// (spec §4.8 step 4).
pub const MAX_PRIME_PAD_TRIES: usize = 100_000;

/// AES key size in bytes (AES-256).
pub const AES_KEY_SIZE: usize = 32;

/// AES block / IV size in bytes.
pub const AES_IV_SIZE: usize = 16;

/// Length of the SHA-512 password hash used to key Argon2.
pub const SHA512_LEN: usize = 64;

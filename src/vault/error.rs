//! Error taxonomy (spec.md §7).
//!
//! `read_slot`'s "wrong password" case is never an error — it returns
//! `Ok(None)` — matching spec.md §9's directive to never throw on a bad
//! password. Every other kind here is a genuine `Err`.

use thiserror::Error;

/// Every way the vault engine can fail, grouped the way spec.md §7
/// groups them.
#[derive(Debug, Error)]
pub enum VaultError {
    /// File too small, phash exhausted, payload too large: surfaced
    /// before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No non-overlapping Shamir offset configuration found within the
    /// search budget.
    #[error("layout search exhausted: {0}")]
    LayoutSearch(String),

    /// The post-write readback did not validate; on-disk state is now
    /// indeterminate.
    #[error("verification failed: {0}")]
    Verification(String),

    /// Propagated I/O error from the underlying file handle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

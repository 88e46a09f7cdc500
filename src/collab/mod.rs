//! Collaborator interfaces: the thin adapters between the vault engine
//! and the outside world (randomness, interactive prompts, salt files).
//!
//! Grounded on the teacher's `ui`/`interactive` split — one module per
//! external concern, kept deliberately thin so the engine in
//! [`crate::vault`] never talks to a terminal or `OsRng` directly.

pub mod prompt;
pub mod random;
pub mod salt;

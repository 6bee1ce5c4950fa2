//! Store error types.

use thiserror::Error;

/// Errors surfaced by the persistence layer.
///
/// Reads never fail here: a corrupt or missing value reads as its
/// fallback and is logged where it happens. What remains is opening
/// the backing directory and uniqueness conflicts on insert.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing directory could not be created.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

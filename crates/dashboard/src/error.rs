//! Dashboard error type.

use kummerkasten_core::EmailError;
use thiserror::Error;

/// Errors surfaced to the submitter.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No account is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// A ticket needs at least a title.
    #[error("ticket title must not be empty")]
    EmptyTitle,

    /// Archived tickets are read-only.
    #[error("ticket is archived")]
    Archived,

    /// An account request needs a name.
    #[error("name must not be empty")]
    MissingName,

    /// An account request needs a usable email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

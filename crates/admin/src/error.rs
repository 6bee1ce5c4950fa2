//! Admin error type.

use kummerkasten_core::{EmailError, UsernameError};
use thiserror::Error;

/// Errors surfaced to staff.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No account is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// The signed-in account lacks the required role or flag.
    #[error("insufficient permissions")]
    Forbidden,

    /// Archived tickets are read-only.
    #[error("ticket is archived")]
    Archived,

    /// Only closed tickets can be archived.
    #[error("ticket is not closed")]
    NotClosed,

    /// Account creation needs a usable username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Account creation needs a password.
    #[error("password must not be empty")]
    MissingPassword,

    /// The username is already taken.
    #[error("username already taken")]
    DuplicateUsername,

    /// Assignees must be existing staff accounts.
    #[error("{0} is not a staff account")]
    NotStaff(String),

    /// The email address does not parse.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

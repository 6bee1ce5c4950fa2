//! Core types for Kummerkasten.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod password;
pub mod role;
pub mod status;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::Password;
pub use role::Role;
pub use status::{Priority, TicketStatus};
pub use username::{Username, UsernameError};

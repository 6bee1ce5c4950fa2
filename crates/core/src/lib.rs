//! Kummerkasten Core - Shared types library.
//!
//! This crate provides common types used across all Kummerkasten components:
//! - `store` - Key-value persistence layer and domain records
//! - `dashboard` - Ticket submission surface for signed-in users
//! - `admin` - Staff board and administration panel
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, credentials, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

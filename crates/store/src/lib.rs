//! Kummerkasten Store - persistence layer.
//!
//! All application state lives in a string key-value backend behind the
//! typed [`Store`] facade. On startup, [`Store::init`] migrates stored
//! data to the current schema, seeds the built-in accounts and default
//! settings, and sweeps stale closed tickets into the archive.
//!
//! # Modules
//!
//! - [`kv`] - Backends: in-memory and one-JSON-file-per-key
//! - [`models`] - Persisted domain records
//! - [`auth`] - Session handling and page guards
//! - [`config`] - Environment-driven storage configuration
//! - [`migrate`] / [`seed`] / [`sweep`] - Startup passes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod keys;
pub mod kv;
pub mod migrate;
pub mod models;
pub mod seed;
pub mod store;
pub mod sweep;

pub use config::{ConfigError, StoreConfig};
pub use error::StoreError;
pub use models::{
    AccountRequest, Attachment, ChatMessage, Comment, GlobalLogEntry, Settings, Ticket,
    TicketLogEntry, User,
};
pub use seed::SeedReport;
pub use store::{GLOBAL_LOG_CAP, InitSummary, Store};
pub use sweep::SweepReport;

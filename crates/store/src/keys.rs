//! Storage key constants.
//!
//! Every piece of application state lives under one of these fixed
//! keys. Key names are part of the persisted layout; renaming one
//! orphans existing data.

/// Schema version marker, a bare integer.
pub const SCHEMA_VERSION: &str = "schema_version";

/// User records, a map keyed by user ID.
pub const USERS: &str = "users";

/// Ticket records, a map keyed by ticket ID.
pub const TICKETS: &str = "tickets";

/// Pending account requests, a map keyed by request ID.
pub const ACCOUNT_REQUESTS: &str = "account_requests";

/// Application settings blob.
pub const SETTINGS: &str = "settings";

/// Global activity log, a capped list.
pub const GLOBAL_LOG: &str = "global_log";

/// Session marker: the username of the signed-in account.
pub const CURRENT_USER: &str = "current_user";

/// Keys only read (and removed) by the schema migration.
pub mod legacy {
    /// Pre-versioning session marker, stored as a raw username string.
    pub const CURRENT_USER: &str = "currentUser";

    /// Pre-versioning display settings blob, merged into
    /// [`SETTINGS`](super::SETTINGS).
    pub const APP_SETTINGS: &str = "app_settings";
}

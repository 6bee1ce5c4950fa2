//! Persisted domain records.

pub mod log;
pub mod request;
pub mod settings;
pub mod ticket;
pub mod user;

pub use log::{GlobalLogEntry, SYSTEM_ACTOR};
pub use request::AccountRequest;
pub use settings::{
    Background, BackgroundKind, DEFAULT_CATEGORY, EmailSettings, LdapSettings, Settings, Theme,
    TwoFactorPolicy,
};
pub use ticket::{Attachment, ChatMessage, Comment, Ticket, TicketLogEntry};
pub use user::{DEPT_WILDCARD, User};

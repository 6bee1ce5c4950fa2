//! Typed facade over the key-value backend.
//!
//! Collections are stored as JSON maps keyed by entity ID under fixed
//! keys; mutations go through addressed updates that rewrite only the
//! affected collection. Nothing here checks permissions - that is the
//! view controllers' job.

use std::collections::BTreeMap;

use chrono::Utc;
use kummerkasten_core::{RequestId, TicketId, UserId, Username};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::keys;
use crate::kv::{self, FileStore, KeyValueStore, MemoryStore};
use crate::migrate;
use crate::models::{
    AccountRequest, Attachment, ChatMessage, GlobalLogEntry, Settings, Ticket, User,
};
use crate::seed::{self, SeedReport};
use crate::sweep::{self, SweepReport};

/// Maximum number of retained global log entries.
pub const GLOBAL_LOG_CAP: usize = 1000;

/// What [`Store::init`] did.
#[derive(Debug, Clone, Copy)]
pub struct InitSummary {
    /// Whether the schema migration ran.
    pub migrated: bool,
    /// Which built-in records were created or repaired.
    pub seed: SeedReport,
    /// Tickets auto-archived during the startup sweep.
    pub sweep: SweepReport,
}

/// Everything the application persists, behind typed accessors.
pub struct Store {
    kv: Box<dyn KeyValueStore>,
}

impl Store {
    /// Wrap an arbitrary backend.
    #[must_use]
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Open a store backed by files in the configured profile directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the profile directory cannot be
    /// created.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend = FileStore::open(config.profile_dir())?;
        Ok(Self::new(Box::new(backend)))
    }

    /// Open an ephemeral in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Bring stored data up to date: run the schema migration, seed the
    /// built-in accounts and settings, and sweep stale closed tickets
    /// into the archive.
    pub fn init(&mut self) -> InitSummary {
        let migrated = migrate::run(self.kv.as_mut());
        let seed = seed::run(self);
        let sweep = sweep::run(self);
        let summary = InitSummary {
            migrated,
            seed,
            sweep,
        };
        tracing::info!(
            migrated = summary.migrated,
            admin_created = summary.seed.admin_created,
            user_created = summary.seed.user_created,
            auto_archived = summary.sweep.total(),
            "store initialized"
        );
        summary
    }

    pub(crate) fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    fn read_map<T: DeserializeOwned>(&self, key: &str) -> BTreeMap<String, T> {
        kv::read_json(self.kv.as_ref(), key, BTreeMap::new)
    }

    fn write_map<T: Serialize>(&mut self, key: &str, map: &BTreeMap<String, T>) {
        kv::write_json(self.kv.as_mut(), key, map);
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All users, sorted by username.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.read_map(keys::USERS).into_values().collect();
        users.sort_by(|a: &User, b: &User| a.username.cmp(&b.username));
        users
    }

    /// Look up a user by ID.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<User> {
        self.read_map(keys::USERS).remove(&id.to_string())
    }

    /// Look up a user by exact username.
    #[must_use]
    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.read_map::<User>(keys::USERS)
            .into_values()
            .find(|user| user.username.as_str() == username)
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the username is taken.
    pub fn insert_user(&mut self, user: User) -> Result<(), StoreError> {
        let mut map = self.read_map::<User>(keys::USERS);
        if map.values().any(|existing| existing.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username already taken: {}",
                user.username
            )));
        }
        map.insert(user.id.to_string(), user);
        self.write_map(keys::USERS, &map);
        Ok(())
    }

    /// Apply `update` to the user with `id`. Returns false when no such
    /// user exists.
    ///
    /// Rewriting the username through the closure bypasses the
    /// uniqueness check in [`Store::insert_user`]; callers keep it
    /// immutable.
    pub fn update_user(&mut self, id: UserId, update: impl FnOnce(&mut User)) -> bool {
        let mut map = self.read_map::<User>(keys::USERS);
        let Some(user) = map.get_mut(&id.to_string()) else {
            return false;
        };
        update(user);
        self.write_map(keys::USERS, &map);
        true
    }

    /// Delete the user with `id`. Returns false when no such user exists.
    pub fn remove_user(&mut self, id: UserId) -> bool {
        let mut map = self.read_map::<User>(keys::USERS);
        if map.remove(&id.to_string()).is_none() {
            return false;
        }
        self.write_map(keys::USERS, &map);
        true
    }

    // =========================================================================
    // Tickets
    // =========================================================================

    /// All tickets, newest first.
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self.read_map(keys::TICKETS).into_values().collect();
        tickets.sort_by(|a: &Ticket, b: &Ticket| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        tickets
    }

    /// Look up a ticket by ID.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.read_map(keys::TICKETS).remove(&id.to_string())
    }

    /// Insert a ticket.
    pub fn insert_ticket(&mut self, ticket: Ticket) {
        let mut map = self.read_map::<Ticket>(keys::TICKETS);
        map.insert(ticket.id.to_string(), ticket);
        self.write_map(keys::TICKETS, &map);
    }

    /// Apply `update` to the ticket with `id`. Returns false when no
    /// such ticket exists.
    pub fn update_ticket(&mut self, id: TicketId, update: impl FnOnce(&mut Ticket)) -> bool {
        let mut map = self.read_map::<Ticket>(keys::TICKETS);
        let Some(ticket) = map.get_mut(&id.to_string()) else {
            return false;
        };
        update(ticket);
        self.write_map(keys::TICKETS, &map);
        true
    }

    /// Delete the ticket with `id`. Returns false when no such ticket
    /// exists.
    pub fn remove_ticket(&mut self, id: TicketId) -> bool {
        let mut map = self.read_map::<Ticket>(keys::TICKETS);
        if map.remove(&id.to_string()).is_none() {
            return false;
        }
        self.write_map(keys::TICKETS, &map);
        true
    }

    /// Append a chat message to a ticket, stamped with `actor`'s display
    /// name and role at send time.
    ///
    /// Empty submissions (no text after trimming, no attachments) and
    /// unknown tickets are no-ops returning false.
    pub fn append_chat_message(
        &mut self,
        id: TicketId,
        actor: &User,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> bool {
        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            return false;
        }

        let author = actor.display_name().to_owned();
        let role = actor.role;
        let detail = (!text.is_empty()).then(|| text.to_owned());
        let message = ChatMessage {
            text: text.to_owned(),
            author: author.clone(),
            role,
            date: Utc::now(),
            attachments,
        };
        self.update_ticket(id, |ticket| {
            ticket.chat.push(message);
            ticket.push_log(&author, "Nachricht gesendet", detail);
        })
    }

    // =========================================================================
    // Account requests
    // =========================================================================

    /// Pending account requests, oldest first.
    #[must_use]
    pub fn account_requests(&self) -> Vec<AccountRequest> {
        let mut requests: Vec<AccountRequest> = self
            .read_map(keys::ACCOUNT_REQUESTS)
            .into_values()
            .collect();
        requests.sort_by(|a: &AccountRequest, b: &AccountRequest| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        requests
    }

    /// Look up an account request by ID.
    #[must_use]
    pub fn account_request(&self, id: RequestId) -> Option<AccountRequest> {
        self.read_map(keys::ACCOUNT_REQUESTS).remove(&id.to_string())
    }

    /// Insert an account request.
    pub fn insert_account_request(&mut self, request: AccountRequest) {
        let mut map = self.read_map::<AccountRequest>(keys::ACCOUNT_REQUESTS);
        map.insert(request.id.to_string(), request);
        self.write_map(keys::ACCOUNT_REQUESTS, &map);
    }

    /// Delete the account request with `id`. Returns false when no such
    /// request exists.
    pub fn remove_account_request(&mut self, id: RequestId) -> bool {
        let mut map = self.read_map::<AccountRequest>(keys::ACCOUNT_REQUESTS);
        if map.remove(&id.to_string()).is_none() {
            return false;
        }
        self.write_map(keys::ACCOUNT_REQUESTS, &map);
        true
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Application settings, falling back to the defaults.
    #[must_use]
    pub fn settings(&self) -> Settings {
        kv::read_json(self.kv.as_ref(), keys::SETTINGS, Settings::default)
    }

    /// Persist the settings blob.
    pub fn save_settings(&mut self, settings: &Settings) {
        kv::write_json(self.kv.as_mut(), keys::SETTINGS, settings);
    }

    pub(crate) fn settings_present(&self) -> bool {
        self.kv.get(keys::SETTINGS).is_some()
    }

    // =========================================================================
    // Global log
    // =========================================================================

    /// The global activity log, oldest first.
    #[must_use]
    pub fn global_log(&self) -> Vec<GlobalLogEntry> {
        kv::read_json(self.kv.as_ref(), keys::GLOBAL_LOG, Vec::new)
    }

    /// Append an entry to the global activity log, dropping the oldest
    /// entries beyond [`GLOBAL_LOG_CAP`].
    pub fn log_global(&mut self, actor: &str, message: impl Into<String>, detail: Option<String>) {
        let mut log = self.global_log();
        log.push(GlobalLogEntry {
            date: Utc::now(),
            actor: actor.to_owned(),
            message: message.into(),
            detail,
        });
        if log.len() > GLOBAL_LOG_CAP {
            let excess = log.len() - GLOBAL_LOG_CAP;
            log.drain(..excess);
        }
        kv::write_json(self.kv.as_mut(), keys::GLOBAL_LOG, &log);
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Username of the signed-in account, if any.
    #[must_use]
    pub fn session_username(&self) -> Option<Username> {
        kv::read_json(self.kv.as_ref(), keys::CURRENT_USER, || None)
    }

    /// Mark `username` as signed in.
    pub fn set_session(&mut self, username: &Username) {
        kv::write_json(self.kv.as_mut(), keys::CURRENT_USER, username);
    }

    /// Clear the session marker.
    pub fn clear_session(&mut self) {
        self.kv.remove(keys::CURRENT_USER);
    }
}

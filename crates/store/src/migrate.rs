//! One-shot migration from the legacy browser-export layout.
//!
//! The first shipped layout kept collections as JSON arrays with
//! abbreviated camelCase field names, stored the session marker as a
//! raw string, and split display settings from the category list.
//! [`run`] lifts all of that into the versioned layout; the stored
//! schema version makes later runs no-ops.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use kummerkasten_core::{Email, Password, Role, Username};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keys;
use crate::kv::{self, KeyValueStore};
use crate::models::{
    AccountRequest, Attachment, Background, ChatMessage, Comment, DEFAULT_CATEGORY, Settings,
    Ticket, TicketLogEntry, User,
};

/// Layout version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Bring stored data up to [`CURRENT_VERSION`].
///
/// Returns true when legacy data was rewritten. Runs at most once per
/// profile; afterwards the stored version short-circuits.
pub fn run(kv: &mut dyn KeyValueStore) -> bool {
    let version = kv
        .get(keys::SCHEMA_VERSION)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(0);
    if version >= CURRENT_VERSION {
        return false;
    }

    let users = lift_collection(kv, keys::USERS, lift_user);
    let tickets = lift_collection(kv, keys::TICKETS, lift_ticket);
    let requests = lift_collection(kv, keys::ACCOUNT_REQUESTS, lift_request);
    let settings = lift_settings(kv);
    let session = lift_session(kv);

    kv.set(keys::SCHEMA_VERSION, &CURRENT_VERSION.to_string());

    let migrated = users || tickets || requests || settings || session;
    if migrated {
        tracing::info!(version = CURRENT_VERSION, "lifted legacy data");
    }
    migrated
}

/// Rewrite one collection from a legacy array into a map keyed by ID.
///
/// Records that fail to parse or convert are dropped individually so a
/// single damaged entry cannot take the rest of the collection with it.
fn lift_collection<L, T>(
    kv: &mut dyn KeyValueStore,
    key: &str,
    lift: impl Fn(L) -> Option<(String, T)>,
) -> bool
where
    L: DeserializeOwned,
    T: Serialize,
{
    let Some(raw) = kv.get(key) else {
        return false;
    };
    let records = match serde_json::from_str::<Value>(&raw) {
        // The current layout stores collections as objects; an array
        // means pre-versioned data.
        Ok(Value::Array(records)) => records,
        Ok(_) => return false,
        Err(error) => {
            tracing::warn!(key, %error, "leaving unreadable legacy collection untouched");
            return false;
        }
    };

    let mut map = BTreeMap::new();
    for record in records {
        match serde_json::from_value::<L>(record) {
            Ok(legacy) => {
                if let Some((id, value)) = lift(legacy) {
                    map.insert(id, value);
                }
            }
            Err(error) => tracing::warn!(key, %error, "dropping unreadable legacy record"),
        }
    }
    kv::write_json(kv, key, &map);
    true
}

// =============================================================================
// Users
// =============================================================================

#[derive(Deserialize)]
struct LegacyUser {
    #[serde(default)]
    id: Option<String>,
    username: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    dept: Option<OneOrMany>,
    #[serde(default, rename = "canManageUsers")]
    can_manage_users: bool,
    #[serde(default, rename = "canManageRequests")]
    can_manage_requests: bool,
}

fn lift_user(legacy: LegacyUser) -> Option<(String, User)> {
    let username = match Username::parse(&legacy.username) {
        Ok(username) => username,
        Err(error) => {
            tracing::warn!(username = legacy.username, %error, "dropping user record");
            return None;
        }
    };

    let role: Role = parse_or_default(legacy.role.as_deref());
    let mut depts = legacy.dept.map(OneOrMany::into_vec).unwrap_or_default();
    depts.retain(|dept| !dept.trim().is_empty());
    // Department-less admins always covered the default category; the
    // new layout says so explicitly.
    if role == Role::Admin && depts.is_empty() {
        depts.push(DEFAULT_CATEGORY.to_owned());
    }

    let user = User {
        // Legacy IDs were not UUIDs; every record gets a fresh one.
        // Relations reference usernames, so nothing dangles.
        id: parse_or_default(legacy.id.as_deref()),
        username,
        password: Password::new(legacy.password.unwrap_or_else(|| Password::DEFAULT.to_owned())),
        name: legacy.name,
        email: legacy.email.as_deref().and_then(lift_email),
        role,
        depts,
        can_manage_users: legacy.can_manage_users,
        can_manage_requests: legacy.can_manage_requests,
        two_factor_enabled: false,
        two_factor_secret: None,
    };
    Some((user.id.to_string(), user))
}

/// An unusable address on a user is survivable; the field just resets.
fn lift_email(raw: &str) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(error) => {
            tracing::warn!(%error, "clearing unusable stored email address");
            None
        }
    }
}

// =============================================================================
// Tickets
// =============================================================================

#[derive(Deserialize)]
struct LegacyTicket {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    prio: Option<String>,
    #[serde(default)]
    category: Option<OneOrMany>,
    #[serde(default)]
    status: Option<String>,
    author: String,
    #[serde(default, rename = "authorName")]
    author_name: String,
    #[serde(default, rename = "createdAt")]
    created_at: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    assignees: Option<Vec<String>>,
    #[serde(default)]
    archived: bool,
    #[serde(default, rename = "archivedAt")]
    archived_at: Option<String>,
    #[serde(default)]
    chat: Option<Vec<LegacyMessage>>,
    #[serde(default)]
    comments: Option<Vec<LegacyMessage>>,
    #[serde(default)]
    logs: Vec<LegacyLogEntry>,
}

/// Chat messages and internal notes shared one shape for a while, so
/// one struct covers both; note-only fields are dropped on conversion.
#[derive(Deserialize)]
struct LegacyMessage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    files: Vec<LegacyFile>,
}

#[derive(Deserialize)]
struct LegacyFile {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    mime: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct LegacyLogEntry {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    user: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    details: Option<String>,
}

fn lift_ticket(legacy: LegacyTicket) -> Option<(String, Ticket)> {
    let author = match Username::parse(&legacy.author) {
        Ok(author) => author,
        Err(error) => {
            tracing::warn!(title = legacy.title, %error, "dropping ticket record");
            return None;
        }
    };

    let mut categories = legacy.category.map(OneOrMany::into_vec).unwrap_or_default();
    categories.retain(|category| !category.trim().is_empty());
    if categories.is_empty() {
        categories.push(DEFAULT_CATEGORY.to_owned());
    }

    // The list form supersedes the old single-assignee field.
    let assignees: Vec<Username> = legacy
        .assignees
        .or_else(|| legacy.assignee.map(|one| vec![one]))
        .unwrap_or_default()
        .iter()
        .filter_map(|raw| Username::parse(raw).ok())
        .collect();

    // Before the chat feature, the chat history lived in `comments`.
    // A ticket without a chat array gets its comments moved over and
    // starts with an empty notes list.
    let comments = legacy.comments.unwrap_or_default();
    let (chat, comments) = match legacy.chat {
        Some(chat) => (chat, comments),
        None => (comments, Vec::new()),
    };

    let author_name = if legacy.author_name.trim().is_empty() {
        author.as_str().to_owned()
    } else {
        legacy.author_name
    };

    let ticket = Ticket {
        id: parse_or_default(legacy.id.as_deref()),
        title: legacy.title,
        description: legacy.desc,
        priority: parse_or_default(legacy.prio.as_deref()),
        categories,
        status: parse_or_default(legacy.status.as_deref()),
        author,
        author_name,
        created_at: lift_date(legacy.created_at.as_deref()),
        assignees,
        archived: legacy.archived,
        archived_at: legacy
            .archived_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|date| date.with_timezone(&Utc)),
        chat: chat.into_iter().map(lift_message).collect(),
        comments: comments.into_iter().map(lift_comment).collect(),
        logs: legacy.logs.into_iter().map(lift_log).collect(),
    };
    Some((ticket.id.to_string(), ticket))
}

fn lift_message(legacy: LegacyMessage) -> ChatMessage {
    ChatMessage {
        text: legacy.text,
        author: legacy.author,
        role: parse_or_default(legacy.role.as_deref()),
        date: lift_date(legacy.date.as_deref()),
        attachments: legacy
            .files
            .into_iter()
            .map(|file| Attachment {
                name: file.name,
                mime: file.mime,
                data: file.data,
            })
            .collect(),
    }
}

fn lift_comment(legacy: LegacyMessage) -> Comment {
    Comment {
        text: legacy.text,
        author: legacy.author,
        date: lift_date(legacy.date.as_deref()),
    }
}

fn lift_log(legacy: LegacyLogEntry) -> TicketLogEntry {
    TicketLogEntry {
        date: lift_date(legacy.date.as_deref()),
        actor: legacy.user,
        message: legacy.msg,
        detail: legacy.details,
    }
}

// =============================================================================
// Account requests
// =============================================================================

#[derive(Deserialize)]
struct LegacyRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    email: String,
    #[serde(default)]
    date: Option<String>,
}

fn lift_request(legacy: LegacyRequest) -> Option<(String, AccountRequest)> {
    // Unlike users, a request is nothing but a name and a way to reply;
    // without a usable address it cannot be answered.
    let email = match Email::parse(&legacy.email) {
        Ok(email) => email,
        Err(error) => {
            tracing::warn!(name = legacy.name, %error, "dropping account request record");
            return None;
        }
    };
    let request = AccountRequest {
        id: parse_or_default(legacy.id.as_deref()),
        name: legacy.name,
        email,
        created_at: lift_date(legacy.date.as_deref()),
    };
    Some((request.id.to_string(), request))
}

// =============================================================================
// Settings and session
// =============================================================================

#[derive(Deserialize)]
struct LegacyAppSettings {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default, rename = "accentColor")]
    accent_color: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default, rename = "bgType")]
    bg_kind: Option<String>,
    #[serde(default, rename = "bgValue")]
    bg_value: Option<String>,
}

#[derive(Deserialize)]
struct LegacyCategories {
    #[serde(default)]
    categories: Option<Vec<String>>,
}

/// Merge the two legacy settings blobs (display under `app_settings`,
/// categories under `settings`) into one.
fn lift_settings(kv: &mut dyn KeyValueStore) -> bool {
    let display = kv.get(keys::legacy::APP_SETTINGS);
    let categories = kv.get(keys::SETTINGS);
    if display.is_none() && categories.is_none() {
        return false;
    }

    let mut settings = Settings::default();
    if let Some(raw) = display.as_deref()
        && let Ok(legacy) = serde_json::from_str::<LegacyAppSettings>(raw)
    {
        settings.theme = legacy.theme.as_deref().map(enum_from_str).unwrap_or_default();
        if let Some(accent) = legacy.accent_color.filter(|accent| !accent.is_empty()) {
            settings.accent_color = accent;
        }
        if let Some(language) = legacy.lang.filter(|language| !language.is_empty()) {
            settings.language = language;
        }
        settings.background = Background {
            kind: legacy
                .bg_kind
                .as_deref()
                .map(enum_from_str)
                .unwrap_or_default(),
            value: legacy.bg_value.unwrap_or_default(),
        };
    }
    if let Some(raw) = categories.as_deref()
        && let Ok(legacy) = serde_json::from_str::<LegacyCategories>(raw)
        && let Some(mut categories) = legacy.categories
    {
        categories.retain(|category| !category.trim().is_empty());
        if !categories.is_empty() {
            settings.categories = categories;
        }
    }

    kv::write_json(kv, keys::SETTINGS, &settings);
    kv.remove(keys::legacy::APP_SETTINGS);
    true
}

/// The legacy session marker was the bare username, not JSON.
fn lift_session(kv: &mut dyn KeyValueStore) -> bool {
    let Some(raw) = kv.get(keys::legacy::CURRENT_USER) else {
        return false;
    };
    kv.remove(keys::legacy::CURRENT_USER);
    match Username::parse(raw.trim().trim_matches('"')) {
        Ok(username) => kv::write_json(kv, keys::CURRENT_USER, &username),
        Err(error) => tracing::warn!(%error, "dropping unusable legacy session marker"),
    }
    true
}

// =============================================================================
// Field helpers
// =============================================================================

/// A field that was stored either as a bare string or as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

fn parse_or_default<T: FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|raw| raw.parse().ok()).unwrap_or_default()
}

fn enum_from_str<T: DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_value(Value::String(raw.to_owned())).unwrap_or_default()
}

fn lift_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(Utc::now, |date| date.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kummerkasten_core::{Priority, TicketStatus};
    use serde_json::json;

    use super::*;
    use crate::kv::MemoryStore;
    use crate::models::{BackgroundKind, Theme};

    fn read_users(kv: &MemoryStore) -> BTreeMap<String, User> {
        kv::read_json(kv, keys::USERS, BTreeMap::new)
    }

    fn read_tickets(kv: &MemoryStore) -> BTreeMap<String, Ticket> {
        kv::read_json(kv, keys::TICKETS, BTreeMap::new)
    }

    fn user_by_name<'a>(users: &'a BTreeMap<String, User>, username: &str) -> &'a User {
        users
            .values()
            .find(|user| user.username.as_str() == username)
            .unwrap()
    }

    #[test]
    fn test_fresh_store_only_gets_a_version_stamp() {
        let mut kv = MemoryStore::new();
        assert!(!run(&mut kv));
        assert_eq!(kv.get(keys::SCHEMA_VERSION).as_deref(), Some("1"));
        assert!(!run(&mut kv));
    }

    #[test]
    fn test_versioned_data_is_left_alone() {
        let mut kv = MemoryStore::new();
        kv.set(keys::SCHEMA_VERSION, "1");
        kv.set(keys::USERS, r#"[{"username":"ghost"}]"#);

        assert!(!run(&mut kv));
        assert_eq!(kv.get(keys::USERS).as_deref(), Some(r#"[{"username":"ghost"}]"#));
    }

    #[test]
    fn test_lifts_users_and_drops_broken_records() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::USERS,
            &json!([
                {"id": "m2x1", "username": "admin", "password": "123", "name": "Administrator",
                 "role": "superadmin", "dept": "All"},
                {"username": "anna", "password": "pw", "role": "admin",
                 "canManageUsers": true},
                {"username": "bob", "password": "pw", "role": "user", "email": "kaputt"},
                {"password": "pw"}
            ])
            .to_string(),
        );

        assert!(run(&mut kv));

        let users = read_users(&kv);
        assert_eq!(users.len(), 3);

        let admin = user_by_name(&users, "admin");
        assert_eq!(admin.role, Role::Superadmin);
        assert_eq!(admin.depts, vec!["All"]);

        // Admins without departments covered "Allgemein" implicitly.
        let anna = user_by_name(&users, "anna");
        assert_eq!(anna.depts, vec!["Allgemein"]);
        assert!(anna.can_manage_users);

        let bob = user_by_name(&users, "bob");
        assert!(bob.email.is_none());
        assert!(bob.password.matches("pw"));
    }

    #[test]
    fn test_comments_become_chat_on_pre_chat_tickets() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::TICKETS,
            &json!([{
                "title": "Drucker kaputt", "author": "bob",
                "createdAt": "2024-03-01T10:00:00.000Z",
                "comments": [{"text": "Hallo?", "author": "Bob",
                              "date": "2024-03-01T10:05:00.000Z"}]
            }])
            .to_string(),
        );

        assert!(run(&mut kv));

        let tickets = read_tickets(&kv);
        let ticket = tickets.values().next().unwrap();
        assert_eq!(ticket.chat.len(), 1);
        assert!(ticket.comments.is_empty());
        let message = ticket.chat.first().unwrap();
        assert_eq!(message.text, "Hallo?");
        assert_eq!(message.role, Role::User);
    }

    #[test]
    fn test_tickets_with_chat_keep_their_notes() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::TICKETS,
            &json!([{
                "title": "VPN", "author": "bob", "prio": "Kritisch",
                "status": "Geschlossen", "category": "Technik",
                "chat": [{"text": "Hi", "author": "Anna", "role": "admin",
                          "files": [{"name": "log.png", "type": "image/png",
                                     "data": "data:image/png;base64,AAAA"}]}],
                "comments": [{"text": "intern", "author": "Anna"}]
            }])
            .to_string(),
        );

        assert!(run(&mut kv));

        let tickets = read_tickets(&kv);
        let ticket = tickets.values().next().unwrap();
        assert_eq!(ticket.priority, Priority::Critical);
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert_eq!(ticket.categories, vec!["Technik"]);
        assert_eq!(ticket.comments.len(), 1);
        let attachment = ticket.chat.first().unwrap().attachments.first().unwrap();
        assert_eq!(attachment.mime, "image/png");
    }

    #[test]
    fn test_assignee_list_wins_over_singular() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::TICKETS,
            &json!([
                {"title": "A", "author": "bob", "assignee": "alt",
                 "assignees": ["anna", "karl"]},
                {"title": "B", "author": "bob", "assignee": "anna"}
            ])
            .to_string(),
        );

        assert!(run(&mut kv));

        let tickets = read_tickets(&kv);
        let a = tickets.values().find(|t| t.title == "A").unwrap();
        let names: Vec<&str> = a.assignees.iter().map(Username::as_str).collect();
        assert_eq!(names, vec!["anna", "karl"]);
        let b = tickets.values().find(|t| t.title == "B").unwrap();
        assert_eq!(b.assignees.len(), 1);
    }

    #[test]
    fn test_unknown_enum_values_fall_back_to_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::TICKETS,
            &json!([{"title": "A", "author": "bob", "prio": "Mega", "status": "Offen"}])
                .to_string(),
        );

        assert!(run(&mut kv));

        let tickets = read_tickets(&kv);
        let ticket = tickets.values().next().unwrap();
        assert_eq!(ticket.priority, Priority::Normal);
        assert_eq!(ticket.status, TicketStatus::New);
        assert_eq!(ticket.categories, vec!["Allgemein"]);
    }

    #[test]
    fn test_log_entries_carry_over() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::TICKETS,
            &json!([{
                "title": "A", "author": "bob",
                "logs": [{"id": "x1", "date": "2024-03-01T10:00:00.000Z",
                          "user": "Administrator", "msg": "Ticket erstellt"},
                         {"user": "Administrator",
                          "msg": "Status geändert von Neu zu Geschlossen",
                          "details": "Board"}]
            }])
            .to_string(),
        );

        assert!(run(&mut kv));

        let tickets = read_tickets(&kv);
        let ticket = tickets.values().next().unwrap();
        assert_eq!(ticket.logs.len(), 2);
        assert_eq!(ticket.logs.first().unwrap().actor, "Administrator");
        assert_eq!(
            ticket.logs.last().unwrap().detail.as_deref(),
            Some("Board")
        );
    }

    #[test]
    fn test_requests_without_usable_email_are_dropped() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::ACCOUNT_REQUESTS,
            &json!([
                {"id": "r1", "name": "Lena", "email": "lena@example.com",
                 "date": "2024-03-01T10:00:00.000Z"},
                {"name": "Kaputt", "email": "nope"}
            ])
            .to_string(),
        );

        assert!(run(&mut kv));

        let requests: BTreeMap<String, AccountRequest> =
            kv::read_json(&kv, keys::ACCOUNT_REQUESTS, BTreeMap::new);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests.values().next().unwrap().name, "Lena");
    }

    #[test]
    fn test_settings_blobs_merge() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::legacy::APP_SETTINGS,
            &json!({"theme": "light", "accentColor": "#ff0000", "lang": "en",
                    "bgType": "color", "bgValue": "#222222"})
            .to_string(),
        );
        kv.set(
            keys::SETTINGS,
            &json!({"categories": ["IT", "HR"]}).to_string(),
        );

        assert!(run(&mut kv));

        let settings: Settings = kv::read_json(&kv, keys::SETTINGS, Settings::default);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.accent_color, "#ff0000");
        assert_eq!(settings.language, "en");
        assert_eq!(settings.background.kind, BackgroundKind::Color);
        assert_eq!(settings.background.value, "#222222");
        assert_eq!(settings.categories, vec!["IT", "HR"]);
        assert!(kv.get(keys::legacy::APP_SETTINGS).is_none());
    }

    #[test]
    fn test_session_marker_becomes_json() {
        let mut kv = MemoryStore::new();
        // The browser stored the bare username, no JSON quoting.
        kv.set(keys::legacy::CURRENT_USER, "admin");

        assert!(run(&mut kv));

        assert!(kv.get(keys::legacy::CURRENT_USER).is_none());
        let session: Option<Username> = kv::read_json(&kv, keys::CURRENT_USER, || None);
        assert_eq!(session.unwrap().as_str(), "admin");
    }

    #[test]
    fn test_second_run_is_a_noop() {
        let mut kv = MemoryStore::new();
        kv.set(
            keys::USERS,
            &json!([{"username": "admin", "password": "123", "role": "superadmin"}]).to_string(),
        );

        assert!(run(&mut kv));
        let after_first = kv.get(keys::USERS);
        assert!(!run(&mut kv));
        assert_eq!(kv.get(keys::USERS), after_first);
    }
}

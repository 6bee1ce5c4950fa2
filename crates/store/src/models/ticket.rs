//! Ticket record and its embedded collections.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use kummerkasten_core::{Priority, Role, TicketId, TicketStatus, Username};
use serde::{Deserialize, Serialize};

/// A support ticket.
///
/// Tickets embed their whole history: the submitter/staff chat, the
/// internal staff notes, and the audit trail all travel with the
/// record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Categories route the ticket to the admins covering them.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub status: TicketStatus,
    /// Username of the submitting account.
    pub author: Username,
    /// Display name of the submitter at submission time.
    #[serde(default)]
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    /// Usernames of staff working this ticket.
    #[serde(default)]
    pub assignees: Vec<Username>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    /// Conversation between submitter and staff, visible to both.
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
    /// Internal staff notes, never shown to the submitter.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Per-ticket audit trail.
    #[serde(default)]
    pub logs: Vec<TicketLogEntry>,
}

impl Ticket {
    /// Create a fresh ticket in [`TicketStatus::New`] with the
    /// submission already logged.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        categories: Vec<String>,
        author: Username,
        author_name: impl Into<String>,
    ) -> Self {
        let author_name = author_name.into();
        let mut ticket = Self {
            id: TicketId::new(),
            title: title.into(),
            description: description.into(),
            priority,
            categories,
            status: TicketStatus::New,
            author,
            author_name: author_name.clone(),
            created_at: Utc::now(),
            assignees: Vec::new(),
            archived: false,
            archived_at: None,
            chat: Vec::new(),
            comments: Vec::new(),
            logs: Vec::new(),
        };
        ticket.push_log(&author_name, "Ticket erstellt", None);
        ticket
    }

    /// Append an audit entry stamped now.
    pub fn push_log(&mut self, actor: &str, message: impl Into<String>, detail: Option<String>) {
        self.logs.push(TicketLogEntry {
            date: Utc::now(),
            actor: actor.to_owned(),
            message: message.into(),
            detail,
        });
    }

    /// When the ticket most recently entered [`TicketStatus::Closed`],
    /// taken from the audit trail. Falls back to the creation time for
    /// trails that predate status logging.
    #[must_use]
    pub fn last_closed_at(&self) -> DateTime<Utc> {
        self.logs
            .iter()
            .rev()
            .find(|entry| entry.message.ends_with("zu Geschlossen"))
            .map_or(self.created_at, |entry| entry.date)
    }
}

/// One message in the submitter/staff conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    /// Display name of the sender at send time.
    pub author: String,
    /// Role of the sender at send time; decides which side of the
    /// conversation the message renders on.
    #[serde(default)]
    pub role: Role,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// A file attached to a chat message, carried inline as a data URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// `data:<mime>;base64,<payload>` URL holding the file contents.
    pub data: String,
}

impl Attachment {
    /// Encode raw bytes into an inline attachment.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: &[u8]) -> Self {
        let mime = mime.into();
        let payload = BASE64.encode(bytes);
        Self {
            name: name.into(),
            data: format!("data:{mime};base64,{payload}"),
            mime,
        }
    }

    /// Decode the data URL back into raw bytes.
    ///
    /// Returns `None` when the stored URL is not in the base64 form
    /// produced by [`Attachment::from_bytes`].
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.data.split_once("base64,")?;
        BASE64.decode(payload).ok()
    }

    /// True for attachments the detail view renders inline.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// An internal staff note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    /// Display name of the staff member.
    pub author: String,
    pub date: DateTime<Utc>,
}

/// One entry in a ticket's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketLogEntry {
    pub date: DateTime<Utc>,
    /// Display name of whoever acted, or `"System"`.
    pub actor: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

//! The staff kanban board and ticket detail operations.

use chrono::{DateTime, Utc};
use kummerkasten_core::{Priority, Role, TicketId, TicketStatus};
use kummerkasten_store::models::{Comment, DEFAULT_CATEGORY};
use kummerkasten_store::{Attachment, Store, Ticket, User, auth};

use crate::error::AdminError;

/// The board split into its three status columns.
///
/// Columns hold only unarchived tickets the acting admin's departments
/// cover, sorted by priority, then newest first.
#[derive(Debug, Clone, Default)]
pub struct KanbanBoard {
    pub new: Vec<Ticket>,
    pub in_progress: Vec<Ticket>,
    pub closed: Vec<Ticket>,
}

impl KanbanBoard {
    /// Tickets across all three columns.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.new.len() + self.in_progress.len() + self.closed.len()
    }
}

/// A staff member's session over the ticket board.
pub struct Board<'a> {
    store: &'a mut Store,
    actor: User,
}

impl<'a> Board<'a> {
    /// Bind the board to the signed-in staff account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without a session and
    /// [`AdminError::Forbidden`] for non-staff accounts.
    pub fn new(store: &'a mut Store) -> Result<Self, AdminError> {
        let actor = auth::current_user(store).ok_or(AdminError::NotSignedIn)?;
        if !actor.is_staff() {
            return Err(AdminError::Forbidden);
        }
        Ok(Self { store, actor })
    }

    /// The account this board acts as.
    #[must_use]
    pub const fn actor(&self) -> &User {
        &self.actor
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Build the kanban columns for the acting admin.
    #[must_use]
    pub fn board(&self) -> KanbanBoard {
        let mut tickets: Vec<Ticket> = self
            .store
            .tickets()
            .into_iter()
            .filter(|ticket| !ticket.archived && self.actor.covers(&ticket.categories))
            .collect();
        tickets.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let mut board = KanbanBoard::default();
        for ticket in tickets {
            match ticket.status {
                TicketStatus::New => board.new.push(ticket),
                TicketStatus::InProgress => board.in_progress.push(ticket),
                TicketStatus::Closed => board.closed.push(ticket),
            }
        }
        board
    }

    /// Ticket detail, archived ones included. The board does not apply
    /// the department filter here; a direct link opens any ticket.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.store.ticket(id)
    }

    /// The archive view: archived tickets, newest archival first,
    /// filtered by a case-insensitive substring over title, author,
    /// author display name, and description.
    #[must_use]
    pub fn archived_tickets(&self, query: &str) -> Vec<Ticket> {
        let query = query.trim().to_lowercase();
        let mut tickets: Vec<Ticket> = self
            .store
            .tickets()
            .into_iter()
            .filter(|ticket| ticket.archived)
            .filter(|ticket| {
                query.is_empty()
                    || ticket.title.to_lowercase().contains(&query)
                    || ticket.author.as_str().to_lowercase().contains(&query)
                    || ticket.author_name.to_lowercase().contains(&query)
                    || ticket.description.to_lowercase().contains(&query)
            })
            .collect();
        tickets.sort_by(|a, b| {
            let a_at = a.archived_at.unwrap_or(DateTime::UNIX_EPOCH);
            let b_at = b.archived_at.unwrap_or(DateTime::UNIX_EPOCH);
            b_at.cmp(&a_at)
        });
        tickets
    }

    /// Every ticket filed by one author, newest first, filtered by a
    /// case-insensitive substring over title and status.
    #[must_use]
    pub fn author_history(&self, author: &str, query: &str) -> Vec<Ticket> {
        let query = query.trim().to_lowercase();
        self.store
            .tickets()
            .into_iter()
            .filter(|ticket| ticket.author.as_str() == author)
            .filter(|ticket| {
                query.is_empty()
                    || ticket.title.to_lowercase().contains(&query)
                    || ticket.status.to_string().to_lowercase().contains(&query)
            })
            .collect()
    }

    // =========================================================================
    // Ticket mutations
    // =========================================================================

    /// Move a ticket to another status column.
    ///
    /// Unknown tickets and same-status moves no-op with `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archived`] on archived tickets.
    pub fn move_ticket(&mut self, id: TicketId, status: TicketStatus) -> Result<bool, AdminError> {
        let ticket = self.active_ticket(id)?;
        let Some(ticket) = ticket else {
            return Ok(false);
        };
        if ticket.status == status {
            return Ok(false);
        }
        let message = format!("Status geändert von {} zu {status}", ticket.status);
        Ok(self.apply_logged(id, &ticket.title, &message, None, |ticket| {
            ticket.status = status;
        }))
    }

    /// Change a ticket's priority.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archived`] on archived tickets.
    pub fn set_priority(&mut self, id: TicketId, priority: Priority) -> Result<bool, AdminError> {
        let Some(ticket) = self.active_ticket(id)? else {
            return Ok(false);
        };
        if ticket.priority == priority {
            return Ok(false);
        }
        let message = format!("Priorität geändert von {} zu {priority}", ticket.priority);
        Ok(self.apply_logged(id, &ticket.title, &message, None, |ticket| {
            ticket.priority = priority;
        }))
    }

    /// Replace a ticket's category list. An empty list falls back to
    /// the default category.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archived`] on archived tickets.
    pub fn set_categories(
        &mut self,
        id: TicketId,
        categories: Vec<String>,
    ) -> Result<bool, AdminError> {
        let Some(ticket) = self.active_ticket(id)? else {
            return Ok(false);
        };
        let mut categories: Vec<String> = categories
            .into_iter()
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty())
            .collect();
        if categories.is_empty() {
            categories.push(DEFAULT_CATEGORY.to_owned());
        }
        if categories == ticket.categories {
            return Ok(false);
        }
        let message = format!(
            "Kategorie geändert von {} zu {}",
            ticket.categories.join(", "),
            categories.join(", ")
        );
        Ok(self.apply_logged(id, &ticket.title, &message, None, |ticket| {
            ticket.categories = categories;
        }))
    }

    /// Add or remove a staff assignee.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotStaff`] when the target does not exist
    /// or is not staff, [`AdminError::Archived`] on archived tickets.
    pub fn toggle_assignee(&mut self, id: TicketId, username: &str) -> Result<bool, AdminError> {
        let Some(ticket) = self.active_ticket(id)? else {
            return Ok(false);
        };
        let target = self
            .store
            .user_by_username(username)
            .filter(User::is_staff)
            .ok_or_else(|| AdminError::NotStaff(username.to_owned()))?;

        let removing = ticket.assignees.contains(&target.username);
        let action = if removing { "entfernt" } else { "hinzugefügt" };
        let message = format!("Admin {} {action}", target.display_name());
        let assignee = target.username;
        Ok(self.apply_logged(id, &ticket.title, &message, None, move |ticket| {
            if removing {
                ticket.assignees.retain(|existing| existing != &assignee);
            } else {
                ticket.assignees.push(assignee);
            }
        }))
    }

    /// Append an internal staff note. Empty text is a silent no-op.
    ///
    /// Notes stay on the ticket log only; they carry no global-log
    /// entry, matching chat messages.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archived`] on archived tickets.
    pub fn post_comment(&mut self, id: TicketId, text: &str) -> Result<bool, AdminError> {
        if self.active_ticket(id)?.is_none() {
            return Ok(false);
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let actor = self.actor.display_name().to_owned();
        let comment = Comment {
            text: text.to_owned(),
            author: actor.clone(),
            date: Utc::now(),
        };
        let detail = Some(text.to_owned());
        Ok(self.store.update_ticket(id, |ticket| {
            ticket.comments.push(comment);
            ticket.push_log(&actor, "Interne Notiz hinzugefügt", detail);
        }))
    }

    /// Send a chat message visible to the submitter.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archived`] on archived tickets.
    pub fn post_chat(
        &mut self,
        id: TicketId,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<bool, AdminError> {
        if self.active_ticket(id)?.is_none() {
            return Ok(false);
        }
        Ok(self.store.append_chat_message(id, &self.actor, text, attachments))
    }

    // =========================================================================
    // Archive
    // =========================================================================

    /// Archive a ticket manually. Already-archived tickets no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotClosed`] unless the ticket is closed.
    pub fn archive_ticket(&mut self, id: TicketId) -> Result<bool, AdminError> {
        let Some(ticket) = self.store.ticket(id) else {
            return Ok(false);
        };
        if ticket.archived {
            return Ok(false);
        }
        if ticket.status != TicketStatus::Closed {
            return Err(AdminError::NotClosed);
        }
        let now = Utc::now();
        Ok(self.apply_logged(id, &ticket.title, "Ticket archiviert", None, |ticket| {
            ticket.archived = true;
            ticket.archived_at = Some(now);
        }))
    }

    /// Bring a ticket back from the archive, forcing it into
    /// In Bearbeitung.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for anyone but superadmins.
    pub fn reactivate_ticket(&mut self, id: TicketId) -> Result<bool, AdminError> {
        if self.actor.role != Role::Superadmin {
            return Err(AdminError::Forbidden);
        }
        let Some(ticket) = self.store.ticket(id) else {
            return Ok(false);
        };
        if !ticket.archived {
            return Ok(false);
        }
        Ok(self.apply_logged(
            id,
            &ticket.title,
            "Ticket aus dem Archiv reaktiviert",
            None,
            |ticket| {
                ticket.archived = false;
                ticket.archived_at = None;
                ticket.status = TicketStatus::InProgress;
            },
        ))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Fetch a ticket for mutation, rejecting archived ones.
    fn active_ticket(&self, id: TicketId) -> Result<Option<Ticket>, AdminError> {
        match self.store.ticket(id) {
            Some(ticket) if ticket.archived => Err(AdminError::Archived),
            other => Ok(other),
        }
    }

    /// Run an addressed update plus the two log entries every board
    /// mutation writes: one on the ticket, one global with the ticket
    /// title as detail.
    fn apply_logged(
        &mut self,
        id: TicketId,
        title: &str,
        message: &str,
        detail: Option<String>,
        update: impl FnOnce(&mut Ticket),
    ) -> bool {
        let actor = self.actor.display_name().to_owned();
        let applied = self.store.update_ticket(id, |ticket| {
            update(ticket);
            ticket.push_log(&actor, message, detail);
        });
        if applied {
            self.store.log_global(&actor, message, Some(title.to_owned()));
            tracing::debug!(ticket = %id, message, "board mutation");
        }
        applied
    }
}

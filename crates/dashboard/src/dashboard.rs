//! The submitter's ticket view.

use kummerkasten_core::{Email, Priority, TicketId};
use kummerkasten_store::models::DEFAULT_CATEGORY;
use kummerkasten_store::{AccountRequest, Attachment, Store, Ticket, User, auth};

use crate::error::DashboardError;

/// Form data for a new ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Empty means the default category.
    pub categories: Vec<String>,
}

/// The signed-in submitter's session over the store.
///
/// Holds the account resolved at construction; a dashboard is meant to
/// live for one page interaction, not across sign-ins.
pub struct Dashboard<'a> {
    store: &'a mut Store,
    user: User,
}

impl<'a> Dashboard<'a> {
    /// Bind the dashboard to the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotSignedIn`] without a session.
    pub fn new(store: &'a mut Store) -> Result<Self, DashboardError> {
        let user = auth::current_user(store).ok_or(DashboardError::NotSignedIn)?;
        Ok(Self { store, user })
    }

    /// The account this dashboard acts as.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// File a new ticket.
    ///
    /// Title and description are trimmed; a submission without
    /// categories lands in the default category.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::EmptyTitle`] when the trimmed title is
    /// empty.
    pub fn create_ticket(&mut self, new: NewTicket) -> Result<Ticket, DashboardError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(DashboardError::EmptyTitle);
        }
        let mut categories: Vec<String> = new
            .categories
            .into_iter()
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty())
            .collect();
        if categories.is_empty() {
            categories.push(DEFAULT_CATEGORY.to_owned());
        }

        let ticket = Ticket::new(
            title,
            new.description.trim(),
            new.priority,
            categories,
            self.user.username.clone(),
            self.user.display_name(),
        );
        self.store.insert_ticket(ticket.clone());
        self.store.log_global(
            self.user.display_name(),
            "Ticket erstellt",
            Some(ticket.title.clone()),
        );
        tracing::info!(ticket = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// The submitter's own tickets, newest first, archived ones
    /// included.
    #[must_use]
    pub fn my_tickets(&self) -> Vec<Ticket> {
        self.store
            .tickets()
            .into_iter()
            .filter(|ticket| ticket.author == self.user.username)
            .collect()
    }

    /// One of the submitter's own tickets. Tickets filed by other
    /// accounts stay invisible.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.store
            .ticket(id)
            .filter(|ticket| ticket.author == self.user.username)
    }

    /// Send a chat message on one of the submitter's tickets.
    ///
    /// Unknown or foreign tickets and empty submissions are no-ops
    /// returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Archived`] on archived tickets.
    pub fn post_chat(
        &mut self,
        id: TicketId,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<bool, DashboardError> {
        let Some(ticket) = self.ticket(id) else {
            return Ok(false);
        };
        if ticket.archived {
            return Err(DashboardError::Archived);
        }
        Ok(self.store.append_chat_message(id, &self.user, text, attachments))
    }
}

/// File an account request from the public login page.
///
/// # Errors
///
/// Returns [`DashboardError::MissingName`] without a name and
/// [`DashboardError::InvalidEmail`] when the address does not parse.
pub fn request_account(
    store: &mut Store,
    name: &str,
    email: &str,
) -> Result<AccountRequest, DashboardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DashboardError::MissingName);
    }
    let email = Email::parse(email.trim())?;
    let request = AccountRequest::new(name, email);
    store.insert_account_request(request.clone());
    tracing::info!(name, "account requested");
    Ok(request)
}

//! User administration: the two-tab account list, account CRUD with
//! ticket disposition, and the CSV transfer.

use chrono::Utc;
use kummerkasten_core::{Email, Password, Role, TicketId, UserId, Username};
use kummerkasten_store::seed::ADMIN_USERNAME;
use kummerkasten_store::{Store, User, auth};

use crate::csv::{self, CsvImportReport};
use crate::error::AdminError;

/// Which half of the account list the manager shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserView {
    /// Plain user accounts.
    Users,
    /// Admins and superadmins. Superadmin-only; other managers are
    /// silently shown the user half instead.
    Staff,
}

/// Form fields for a directly created account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    /// Empty means no address on file.
    pub email: String,
    pub role: Role,
    /// Departments, attached only when the final role is admin.
    pub depts: Vec<String>,
    pub can_manage_users: bool,
    pub can_manage_requests: bool,
}

/// Partial update for an existing account; `None` keeps the stored
/// value. Usernames are immutable.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    /// `Some("")` clears the address.
    pub email: Option<String>,
    /// Blank passwords are ignored; the account keeps its old one.
    pub password: Option<String>,
    /// Superadmin-only; silently left unchanged for other actors.
    pub role: Option<Role>,
    pub depts: Option<Vec<String>>,
    /// Superadmin-only, like [`UserUpdate::role`].
    pub can_manage_users: Option<bool>,
    pub can_manage_requests: Option<bool>,
}

/// What happens to a deleted account's tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketDisposition {
    /// Leave them on the board with a dangling author.
    Keep,
    /// Move them into the archive.
    Archive,
    /// Remove them outright.
    Delete,
}

/// A staff member's session over the user manager.
pub struct UserManager<'a> {
    store: &'a mut Store,
    actor: User,
}

impl<'a> UserManager<'a> {
    /// Bind the manager to the signed-in staff account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without a session and
    /// [`AdminError::Forbidden`] unless the account is a superadmin or
    /// carries the user-management flag.
    pub fn new(store: &'a mut Store) -> Result<Self, AdminError> {
        let actor = auth::current_user(store).ok_or(AdminError::NotSignedIn)?;
        let allowed =
            actor.is_staff() && (actor.role == Role::Superadmin || actor.can_manage_users);
        if !allowed {
            return Err(AdminError::Forbidden);
        }
        Ok(Self { store, actor })
    }

    /// The account this manager acts as.
    #[must_use]
    pub const fn actor(&self) -> &User {
        &self.actor
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Accounts in one view, filtered by a case-insensitive substring
    /// over username, name, and email.
    #[must_use]
    pub fn users(&self, view: UserView, query: &str) -> Vec<User> {
        let view = if self.actor.role == Role::Superadmin {
            view
        } else {
            UserView::Users
        };
        let query = query.trim().to_lowercase();
        self.store
            .users()
            .into_iter()
            .filter(|user| match view {
                UserView::Users => user.role == Role::User,
                UserView::Staff => user.is_staff(),
            })
            .filter(|user| {
                query.is_empty()
                    || user.username.as_str().to_lowercase().contains(&query)
                    || user.name.to_lowercase().contains(&query)
                    || user
                        .email
                        .as_ref()
                        .is_some_and(|email| email.as_str().to_lowercase().contains(&query))
            })
            .collect()
    }

    // =========================================================================
    // Account CRUD
    // =========================================================================

    /// Create an account from the form fields.
    ///
    /// Non-superadmin actors always create plain users. Departments
    /// and management flags stick only when the final role is admin.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidUsername`],
    /// [`AdminError::MissingPassword`], or [`AdminError::InvalidEmail`]
    /// on unusable form input, and [`AdminError::DuplicateUsername`]
    /// when the username is taken.
    pub fn create_user(&mut self, new: NewUser) -> Result<User, AdminError> {
        let username = Username::parse(new.username.trim())?;
        let password = new.password.trim();
        if password.is_empty() {
            return Err(AdminError::MissingPassword);
        }
        let email = parse_email(&new.email)?;

        let role = if self.actor.role == Role::Superadmin {
            new.role
        } else {
            Role::User
        };
        let grants_admin = role == Role::Admin;
        let user = User {
            id: UserId::new(),
            username,
            password: Password::new(password),
            name: new.name.trim().to_owned(),
            email,
            role,
            depts: if grants_admin { new.depts } else { Vec::new() },
            can_manage_users: grants_admin && new.can_manage_users,
            can_manage_requests: grants_admin && new.can_manage_requests,
            two_factor_enabled: false,
            two_factor_secret: None,
        };

        if self.store.insert_user(user.clone()).is_err() {
            return Err(AdminError::DuplicateUsername);
        }
        let actor = self.actor.display_name().to_owned();
        self.store
            .log_global(&actor, "Benutzer erstellt", Some(user.username.to_string()));
        tracing::info!(username = %user.username, role = %user.role, "user created");
        Ok(user)
    }

    /// Apply a partial update to an account.
    ///
    /// Role and flag changes only take effect for superadmin actors.
    /// The department list follows the final role: it is cleared
    /// whenever the account ends up as anything but an admin. Returns
    /// `Ok(false)` when the account vanished.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] when a non-superadmin touches
    /// a staff account, [`AdminError::InvalidEmail`] on a bad address.
    pub fn update_user(&mut self, id: UserId, update: UserUpdate) -> Result<bool, AdminError> {
        let Some(target) = self.store.user(id) else {
            return Ok(false);
        };
        let is_super = self.actor.role == Role::Superadmin;
        if !is_super && target.is_staff() {
            // Other managers only ever see the plain-user tab.
            return Err(AdminError::Forbidden);
        }
        let email = match update.email.as_deref() {
            None => None,
            Some(raw) => Some(parse_email(raw)?),
        };
        let final_role = if is_super {
            update.role.unwrap_or(target.role)
        } else {
            target.role
        };

        let applied = self.store.update_user(id, |user| {
            if let Some(name) = update.name {
                user.name = name.trim().to_owned();
            }
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(password) = update.password {
                let password = password.trim();
                if !password.is_empty() {
                    user.password = Password::new(password);
                }
            }
            if is_super {
                user.role = final_role;
                if let Some(flag) = update.can_manage_users {
                    user.can_manage_users = flag;
                }
                if let Some(flag) = update.can_manage_requests {
                    user.can_manage_requests = flag;
                }
            }
            if let Some(depts) = update.depts {
                user.depts = depts;
            }
            // Departments and flags only mean something on admins.
            if final_role != Role::Admin {
                user.depts = Vec::new();
                user.can_manage_users = false;
                user.can_manage_requests = false;
            }
        });
        if applied {
            let actor = self.actor.display_name().to_owned();
            self.store.log_global(
                &actor,
                "Benutzer aktualisiert",
                Some(target.username.to_string()),
            );
            tracing::debug!(username = %target.username, "user updated");
        }
        Ok(applied)
    }

    /// Delete an account, carrying out the chosen disposition over the
    /// tickets it authored. Returns `Ok(false)` when the account
    /// vanished.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for superadmin targets, the
    /// built-in `admin` account, and staff targets of non-superadmin
    /// actors.
    pub fn delete_user(
        &mut self,
        id: UserId,
        disposition: TicketDisposition,
    ) -> Result<bool, AdminError> {
        let Some(target) = self.store.user(id) else {
            return Ok(false);
        };
        if target.role == Role::Superadmin || target.username.as_str() == ADMIN_USERNAME {
            return Err(AdminError::Forbidden);
        }
        if self.actor.role != Role::Superadmin && target.is_staff() {
            return Err(AdminError::Forbidden);
        }

        let actor = self.actor.display_name().to_owned();
        let authored: Vec<TicketId> = self
            .store
            .tickets()
            .into_iter()
            .filter(|ticket| ticket.author == target.username)
            .map(|ticket| ticket.id)
            .collect();
        match disposition {
            TicketDisposition::Keep => {}
            TicketDisposition::Archive => {
                let now = Utc::now();
                for ticket_id in authored {
                    self.store.update_ticket(ticket_id, |ticket| {
                        if !ticket.archived {
                            ticket.archived = true;
                            ticket.archived_at = Some(now);
                            ticket.push_log(&actor, "Ticket archiviert", None);
                        }
                    });
                }
            }
            TicketDisposition::Delete => {
                for ticket_id in authored {
                    self.store.remove_ticket(ticket_id);
                }
            }
        }

        self.store.remove_user(id);
        self.store.log_global(
            &actor,
            "Benutzer gelöscht",
            Some(target.username.to_string()),
        );
        tracing::info!(username = %target.username, ?disposition, "user deleted");
        Ok(true)
    }

    // =========================================================================
    // CSV transfer
    // =========================================================================

    /// Render every account as CSV.
    #[must_use]
    pub fn export_csv(&self) -> String {
        csv::export_users(&self.store.users())
    }

    /// Create accounts from CSV text produced by [`Self::export_csv`].
    ///
    /// The first line is taken as the header and dropped. Malformed
    /// rows, unusable usernames, and collisions with existing accounts
    /// are skipped and counted. Imported accounts all start over with
    /// the default password.
    pub fn import_csv(&mut self, text: &str) -> CsvImportReport {
        let mut report = CsvImportReport::default();
        for line in text.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let Some(user) = csv::user_from_row(line) else {
                report.skipped += 1;
                continue;
            };
            match self.store.insert_user(user) {
                Ok(()) => report.imported += 1,
                Err(_) => report.skipped += 1,
            }
        }

        let actor = self.actor.display_name().to_owned();
        self.store.log_global(
            &actor,
            "CSV-Import durchgeführt",
            Some(format!(
                "{} importiert, {} übersprungen",
                report.imported, report.skipped
            )),
        );
        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            "csv import finished"
        );
        report
    }
}

/// Lift the optional email form field.
fn parse_email(raw: &str) -> Result<Option<Email>, AdminError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(Email::parse(raw)?))
}

//! Account-request review: turn requests into accounts, or reject them.

use kummerkasten_core::{Password, RequestId, Role, UserId, Username};
use kummerkasten_store::{AccountRequest, Store, User, auth};

use crate::error::AdminError;

/// Credentials and grants for the account created out of a request.
///
/// Name and email are not part of the form; they come from the request
/// itself.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Departments, attached only when the final role is admin.
    pub depts: Vec<String>,
}

impl NewAccount {
    /// Prefill for the approval form: username suggested from the
    /// applicant's name, everything else at its defaults.
    #[must_use]
    pub fn prefill(request: &AccountRequest) -> Self {
        Self {
            username: Username::suggest(&request.name),
            ..Self::default()
        }
    }
}

/// A staff member's session over the account request queue.
pub struct RequestManager<'a> {
    store: &'a mut Store,
    actor: User,
}

impl<'a> RequestManager<'a> {
    /// Bind the queue to the signed-in staff account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without a session and
    /// [`AdminError::Forbidden`] unless the account is a superadmin or
    /// carries the request-management flag.
    pub fn new(store: &'a mut Store) -> Result<Self, AdminError> {
        let actor = auth::current_user(store).ok_or(AdminError::NotSignedIn)?;
        let allowed =
            actor.is_staff() && (actor.role == Role::Superadmin || actor.can_manage_requests);
        if !allowed {
            return Err(AdminError::Forbidden);
        }
        Ok(Self { store, actor })
    }

    /// The account this queue acts as.
    #[must_use]
    pub const fn actor(&self) -> &User {
        &self.actor
    }

    /// Pending requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<AccountRequest> {
        self.store.account_requests()
    }

    /// Approve a request: create the account and drop the request.
    ///
    /// Name and email carry over from the request. Non-superadmin
    /// actors always create plain users; departments stick only when
    /// the final role is admin. Returns `Ok(None)` when the request
    /// vanished in the meantime.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidUsername`] or
    /// [`AdminError::MissingPassword`] on unusable form input, and
    /// [`AdminError::DuplicateUsername`] when the username is taken;
    /// the request survives all of these.
    pub fn approve_request(
        &mut self,
        id: RequestId,
        account: NewAccount,
    ) -> Result<Option<User>, AdminError> {
        let Some(request) = self.store.account_request(id) else {
            return Ok(None);
        };

        let username = Username::parse(account.username.trim())?;
        let password = account.password.trim();
        if password.is_empty() {
            return Err(AdminError::MissingPassword);
        }

        let role = if self.actor.role == Role::Superadmin {
            account.role
        } else {
            Role::User
        };
        let user = User {
            id: UserId::new(),
            username,
            password: Password::new(password),
            name: request.name.clone(),
            email: Some(request.email),
            role,
            depts: if role == Role::Admin {
                account.depts
            } else {
                Vec::new()
            },
            can_manage_users: false,
            can_manage_requests: false,
            two_factor_enabled: false,
            two_factor_secret: None,
        };

        if self.store.insert_user(user.clone()).is_err() {
            return Err(AdminError::DuplicateUsername);
        }
        self.store.remove_account_request(id);

        let actor = self.actor.display_name().to_owned();
        self.store
            .log_global(&actor, "Kontoanfrage angenommen", Some(request.name));
        tracing::info!(username = %user.username, role = %user.role, "account request approved");
        Ok(Some(user))
    }

    /// Drop a request without creating an account. Returns `false`
    /// when it already vanished.
    pub fn reject_request(&mut self, id: RequestId) -> bool {
        let Some(request) = self.store.account_request(id) else {
            return false;
        };
        self.store.remove_account_request(id);

        let actor = self.actor.display_name().to_owned();
        self.store
            .log_global(&actor, "Kontoanfrage abgelehnt", Some(request.name));
        tracing::info!(request = %id, "account request rejected");
        true
    }
}

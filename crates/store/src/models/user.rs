//! User account record.

use kummerkasten_core::{Email, Password, Role, UserId, Username};
use serde::{Deserialize, Serialize};

/// Department entry granting an admin visibility into every category.
pub const DEPT_WILDCARD: &str = "All";

/// A user account.
///
/// The department list and the two management flags only matter for
/// admins: departments scope which tickets an admin sees on the board,
/// the flags open the user manager and the account request queue.
/// Superadmins ignore all three and hold every right.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password: Password,
    /// Display name shown on tickets, chat messages, and logs.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub role: Role,
    /// Departments this admin covers; [`DEPT_WILDCARD`] covers everything.
    #[serde(default)]
    pub depts: Vec<String>,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_manage_requests: bool,
    /// Whether this account completed TOTP enrollment.
    #[serde(default)]
    pub two_factor_enabled: bool,
    /// TOTP secret, set once enrollment starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_secret: Option<String>,
}

impl User {
    /// Name shown on tickets and logs; falls back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.username.as_str()
        } else {
            &self.name
        }
    }

    /// True for accounts allowed onto the board.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// True when this account covers a ticket filed under `categories`.
    ///
    /// Superadmins cover everything. Admins cover tickets whose category
    /// list intersects their departments, with [`DEPT_WILDCARD`] as a
    /// wildcard. Plain users cover nothing.
    #[must_use]
    pub fn covers(&self, categories: &[String]) -> bool {
        match self.role {
            Role::Superadmin => true,
            Role::Admin => self
                .depts
                .iter()
                .any(|dept| dept == DEPT_WILDCARD || categories.contains(dept)),
            Role::User => false,
        }
    }
}

//! Account roles.

use serde::{Deserialize, Serialize};

/// Permission tier of an account.
///
/// Plain users submit tickets through the dashboard; admins and
/// superadmins staff the board. Department scoping and the management
/// flags on a user record narrow what an admin sees and may touch,
/// while superadmins always hold every right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits tickets and follows their progress.
    #[default]
    User,
    /// Works the board for the departments assigned to them.
    Admin,
    /// Full access to every board, panel, and setting.
    Superadmin,
}

impl Role {
    /// True for accounts allowed onto the board.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

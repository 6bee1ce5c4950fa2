//! Account request record.

use chrono::{DateTime, Utc};
use kummerkasten_core::{Email, RequestId};
use serde::{Deserialize, Serialize};

/// A pending request for an account, submitted from the login page.
///
/// Requests carry no credentials; the approving staff member picks the
/// username and starting password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRequest {
    pub id: RequestId,
    /// Full name of the applicant.
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl AccountRequest {
    /// Create a request stamped now.
    #[must_use]
    pub fn new(name: impl Into<String>, email: Email) -> Self {
        Self {
            id: RequestId::new(),
            name: name.into(),
            email,
            created_at: Utc::now(),
        }
    }
}

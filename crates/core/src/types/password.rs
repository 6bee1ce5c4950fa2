//! Password type with redacted debug output.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A stored password.
///
/// Passwords are held in plain text and checked with simple string
/// equality. The one piece of hardening this type adds is a redacted
/// `Debug` implementation so credentials never leak into logs or
/// error output.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// The password assigned to seeded accounts and to accounts restored
    /// through a CSV import.
    pub const DEFAULT: &'static str = "123";

    /// Wrap a raw password string.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Check a login attempt against the stored password.
    #[must_use]
    pub fn matches(&self, attempt: &str) -> bool {
        self.0 == attempt
    }

    /// Returns the raw password. Needed for persistence; avoid elsewhere.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&"[REDACTED]").finish()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(password.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let password = Password::new("geheim");
        assert!(password.matches("geheim"));
        assert!(!password.matches("Geheim"));
        assert!(!password.matches(""));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("super-secret");
        let debug = format!("{password:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_serde_transparent() {
        let password = Password::new("123");
        let json = serde_json::to_string(&password).unwrap();
        assert_eq!(json, "\"123\"");

        let parsed: Password = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, password);
    }

    #[test]
    fn test_default_constant() {
        assert!(Password::new(Password::DEFAULT).matches("123"));
    }
}

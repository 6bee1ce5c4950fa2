//! Application settings blob.

use kummerkasten_core::Password;
use serde::{Deserialize, Serialize};

/// Category every fresh installation starts with and the fallback for
/// tickets submitted without one.
pub const DEFAULT_CATEGORY: &str = "Allgemein";

const DEFAULT_ACCENT: &str = "#6366f1";
const DEFAULT_LANGUAGE: &str = "de";

/// UI color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// How the board background is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// Theme-provided gradient.
    #[default]
    Default,
    /// Flat color or CSS gradient in [`Background::value`].
    Color,
    /// Image data URL in [`Background::value`].
    Image,
    /// Preset style class name in [`Background::value`].
    Class,
}

/// Background selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Background {
    #[serde(default)]
    pub kind: BackgroundKind,
    /// Meaning depends on `kind`; empty for the default background.
    #[serde(default)]
    pub value: String,
}

/// Outbound mail account for notifications.
///
/// Stored for the settings panel; nothing in this workspace dispatches
/// mail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Password,
    /// Sender address on outgoing mail.
    pub from_address: String,
}

/// Directory connection for account lookups.
///
/// Stored for the settings panel; nothing in this workspace binds to
/// the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapSettings {
    pub server_url: String,
    pub base_dn: String,
    pub bind_user: String,
    pub bind_password: Password,
}

/// Two-factor enrollment policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TwoFactorPolicy {
    /// Require TOTP enrollment for staff accounts.
    #[serde(default)]
    pub require_for_staff: bool,
}

/// Application-wide settings.
///
/// Unknown or missing fields deserialize to their defaults so older
/// blobs keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_accent")]
    pub accent_color: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub background: Background,
    /// Ticket categories, doubling as the department names admins cover.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldap: Option<LdapSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor: Option<TwoFactorPolicy>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            accent_color: default_accent(),
            language: default_language(),
            background: Background::default(),
            categories: default_categories(),
            email: None,
            ldap: None,
            two_factor: None,
        }
    }
}

fn default_accent() -> String {
    DEFAULT_ACCENT.to_owned()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

fn default_categories() -> Vec<String> {
    [DEFAULT_CATEGORY, "Technik", "Account", "Abrechnung"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

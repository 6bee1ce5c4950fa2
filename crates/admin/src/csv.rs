//! The flat CSV transfer format for user accounts.
//!
//! Header `id,username,name,email,role,dept`; every field is
//! `""`-quoted with embedded quotes doubled, and the `dept` column
//! joins multiple departments with `;`. [`crate::users::UserManager`]
//! drives import and export; this module owns the raw format.

use kummerkasten_core::{Email, Password, UserId, Username};
use kummerkasten_store::User;

/// Counts reported after a CSV import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvImportReport {
    /// Accounts created.
    pub imported: usize,
    /// Rows dropped: malformed, unusable username, or a collision with
    /// an existing account.
    pub skipped: usize,
}

pub(crate) const HEADER: &str = "id,username,name,email,role,dept";

/// Render accounts into CSV, header first.
pub(crate) fn export_users(users: &[User]) -> String {
    use std::fmt::Write;

    let mut csv = String::from(HEADER);
    csv.push('\n');
    for user in users {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{}",
            quote(&user.id.to_string()),
            quote(user.username.as_str()),
            quote(&user.name),
            quote(user.email.as_ref().map_or("", Email::as_str)),
            quote(&user.role.to_string()),
            quote(&user.depts.join(";")),
        );
    }
    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Split one line into its fields, honoring quoting and doubled
/// quotes. Returns `None` when a quote is left open.
pub(crate) fn split_row(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(field);
    Some(fields)
}

/// Lift one data row into a user record.
///
/// Lenient where the schema migration is lenient: unparseable ids get
/// fresh ones, unknown roles collapse to `user`, an invalid email
/// clears the field. Wrong column counts and unusable usernames make
/// the row itself unusable and yield `None`. Imported accounts always
/// start over with the default password.
pub(crate) fn user_from_row(line: &str) -> Option<User> {
    let fields = split_row(line)?;
    let [id, username, name, email, role, dept] = <[String; 6]>::try_from(fields).ok()?;
    let username = Username::parse(username.trim()).ok()?;
    Some(User {
        id: id.parse().unwrap_or_else(|_| UserId::new()),
        username,
        password: Password::new(Password::DEFAULT),
        name,
        email: Email::parse(&email).ok(),
        role: role.parse().unwrap_or_default(),
        depts: dept
            .split(';')
            .filter(|dept| !dept.is_empty())
            .map(str::to_owned)
            .collect(),
        can_manage_users: false,
        can_manage_requests: false,
        two_factor_enabled: false,
        two_factor_secret: None,
    })
}

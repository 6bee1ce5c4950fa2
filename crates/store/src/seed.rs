//! Built-in records every installation starts with.

use kummerkasten_core::{Password, Role, UserId, Username};

use crate::models::{DEPT_WILDCARD, Settings, User};
use crate::store::Store;

/// Username of the built-in administrator account.
pub const ADMIN_USERNAME: &str = "admin";

/// Username of the built-in demo account.
pub const DEMO_USERNAME: &str = "user";

/// Which built-in records [`run`] created or repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub admin_created: bool,
    /// True when an existing admin account was restored to superadmin.
    pub admin_promoted: bool,
    pub user_created: bool,
    pub settings_created: bool,
}

/// Create the built-in accounts and default settings where missing.
///
/// Existing records are never overwritten; the one exception is the
/// built-in admin, which always holds superadmin rights even when older
/// data says otherwise. Its password stays untouched.
pub fn run(store: &mut Store) -> SeedReport {
    let mut report = SeedReport::default();

    report.admin_created = ensure_account(
        store,
        ADMIN_USERNAME,
        "Administrator",
        Role::Superadmin,
        vec![DEPT_WILDCARD.to_owned()],
    );
    if !report.admin_created
        && let Some(admin) = store.user_by_username(ADMIN_USERNAME)
        && admin.role != Role::Superadmin
    {
        report.admin_promoted = store.update_user(admin.id, |user| {
            user.role = Role::Superadmin;
            user.depts = vec![DEPT_WILDCARD.to_owned()];
        });
    }

    report.user_created =
        ensure_account(store, DEMO_USERNAME, "Max Mustermann", Role::User, Vec::new());

    if !store.settings_present() {
        store.save_settings(&Settings::default());
        report.settings_created = true;
    }

    if report.admin_created || report.admin_promoted || report.user_created || report.settings_created
    {
        tracing::info!(
            admin_created = report.admin_created,
            admin_promoted = report.admin_promoted,
            user_created = report.user_created,
            settings_created = report.settings_created,
            "seeded built-in records"
        );
    }
    report
}

/// Create an account with the default password unless the username is
/// already taken. Returns true when a record was written.
fn ensure_account(
    store: &mut Store,
    username: &str,
    name: &str,
    role: Role,
    depts: Vec<String>,
) -> bool {
    if store.user_by_username(username).is_some() {
        return false;
    }
    let Ok(username) = Username::parse(username) else {
        return false;
    };
    let user = User {
        id: UserId::new(),
        username,
        password: Password::new(Password::DEFAULT),
        name: name.to_owned(),
        email: None,
        role,
        depts,
        can_manage_users: false,
        can_manage_requests: false,
        two_factor_enabled: false,
        two_factor_secret: None,
    };
    store.insert_user(user).is_ok()
}

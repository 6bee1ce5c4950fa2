//! Sign-in, sign-out, and page guards.
//!
//! The session is nothing but a stored username; every call resolves it
//! against the user collection anew, so deleting an account signs its
//! session out implicitly.

use crate::models::User;
use crate::store::Store;

/// The page a visitor is about to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageGuard {
    /// The public sign-in page.
    Login,
    /// The submitter's dashboard, any signed-in account.
    Dashboard,
    /// The staff board, admins and superadmins only.
    Board,
}

/// What the caller should do before showing the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    ToLogin,
    ToDashboard,
    ToBoard,
}

/// Check credentials and mark the account as signed in.
///
/// The username is trimmed the way the login form trims it; the
/// password is compared verbatim. Returns `None` on any mismatch
/// without saying which part was wrong.
pub fn login(store: &mut Store, username: &str, password: &str) -> Option<User> {
    let username = username.trim();
    let user = store
        .user_by_username(username)
        .filter(|user| user.password.matches(password));
    match user {
        Some(user) => {
            store.set_session(&user.username);
            tracing::info!(username = %user.username, "signed in");
            Some(user)
        }
        None => {
            tracing::debug!(username, "sign-in rejected");
            None
        }
    }
}

/// Clear the session marker.
pub fn logout(store: &mut Store) {
    store.clear_session();
}

/// Resolve the session marker to its account.
///
/// A marker pointing at a deleted account resolves to `None`; the stale
/// marker itself is left in place.
#[must_use]
pub fn current_user(store: &Store) -> Option<User> {
    let username = store.session_username()?;
    store.user_by_username(username.as_str())
}

/// Decide whether the signed-in state fits the page.
///
/// Anonymous visitors of guarded pages go to the login page. Signed-in
/// visitors of the login page go to their home page. Non-staff accounts
/// on the board go to the dashboard.
#[must_use]
pub fn check_guard(store: &Store, guard: PageGuard) -> GuardOutcome {
    let user = current_user(store);
    match (guard, user) {
        (PageGuard::Login, None) => GuardOutcome::Allow,
        (PageGuard::Login, Some(user)) if user.is_staff() => GuardOutcome::ToBoard,
        (PageGuard::Login, Some(_)) => GuardOutcome::ToDashboard,
        (_, None) => GuardOutcome::ToLogin,
        (PageGuard::Dashboard, Some(_)) => GuardOutcome::Allow,
        (PageGuard::Board, Some(user)) if user.is_staff() => GuardOutcome::Allow,
        (PageGuard::Board, Some(_)) => GuardOutcome::ToDashboard,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kummerkasten_core::{Role, Username};

    use super::*;
    use crate::seed;

    fn seeded_store() -> Store {
        let mut store = Store::in_memory();
        seed::run(&mut store);
        store
    }

    #[test]
    fn test_login_sets_session() {
        let mut store = seeded_store();
        let user = login(&mut store, "admin", "123").unwrap();
        assert_eq!(user.role, Role::Superadmin);
        assert_eq!(store.session_username().unwrap().as_str(), "admin");
    }

    #[test]
    fn test_login_trims_the_username_only() {
        let mut store = seeded_store();
        assert!(login(&mut store, "  admin  ", "123").is_some());
        assert!(login(&mut store, "admin", " 123 ").is_none());
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let mut store = seeded_store();
        assert!(login(&mut store, "admin", "nope").is_none());
        assert!(login(&mut store, "ghost", "123").is_none());
        assert!(store.session_username().is_none());
    }

    #[test]
    fn test_logout_clears_session() {
        let mut store = seeded_store();
        login(&mut store, "admin", "123").unwrap();
        logout(&mut store);
        assert!(store.session_username().is_none());
        assert!(current_user(&store).is_none());
    }

    #[test]
    fn test_dangling_session_resolves_to_nobody() {
        let mut store = seeded_store();
        store.set_session(&Username::parse("verschwunden").unwrap());
        assert!(current_user(&store).is_none());
    }

    #[test]
    fn test_anonymous_visitors() {
        let store = seeded_store();
        assert_eq!(check_guard(&store, PageGuard::Login), GuardOutcome::Allow);
        assert_eq!(
            check_guard(&store, PageGuard::Dashboard),
            GuardOutcome::ToLogin
        );
        assert_eq!(check_guard(&store, PageGuard::Board), GuardOutcome::ToLogin);
    }

    #[test]
    fn test_signed_in_user_routing() {
        let mut store = seeded_store();
        login(&mut store, "user", "123").unwrap();

        assert_eq!(
            check_guard(&store, PageGuard::Login),
            GuardOutcome::ToDashboard
        );
        assert_eq!(
            check_guard(&store, PageGuard::Dashboard),
            GuardOutcome::Allow
        );
        assert_eq!(
            check_guard(&store, PageGuard::Board),
            GuardOutcome::ToDashboard
        );
    }

    #[test]
    fn test_signed_in_staff_routing() {
        let mut store = seeded_store();
        login(&mut store, "admin", "123").unwrap();

        assert_eq!(check_guard(&store, PageGuard::Login), GuardOutcome::ToBoard);
        assert_eq!(
            check_guard(&store, PageGuard::Dashboard),
            GuardOutcome::Allow
        );
        assert_eq!(check_guard(&store, PageGuard::Board), GuardOutcome::Allow);
    }
}

//! Category administration: the settings list plus the department
//! assignments it drives on staff accounts.

use kummerkasten_core::{Role, Username};
use kummerkasten_store::{Store, User, auth};

use crate::error::AdminError;

/// A superadmin's session over the category list.
///
/// Categories double as the department names on staff accounts, so the
/// editing operations here take the desired staff assignment and sync
/// `depts` alongside the settings list.
pub struct CategoryManager<'a> {
    store: &'a mut Store,
    actor: User,
}

impl<'a> CategoryManager<'a> {
    /// Bind the manager to the signed-in superadmin.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] without a session and
    /// [`AdminError::Forbidden`] for everyone below superadmin.
    pub fn new(store: &'a mut Store) -> Result<Self, AdminError> {
        let actor = auth::current_user(store).ok_or(AdminError::NotSignedIn)?;
        if actor.role != Role::Superadmin {
            return Err(AdminError::Forbidden);
        }
        Ok(Self { store, actor })
    }

    /// The configured category list.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.store.settings().categories
    }

    /// Add a category and hand it to the assigned staff accounts.
    ///
    /// Returns `true` when the settings list gained the name. A name
    /// already on the list still syncs the assignment, so the form
    /// doubles as an assignment editor. Blank names do nothing.
    pub fn add_category(&mut self, name: &str, assigned: &[Username]) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let mut settings = self.store.settings();
        let added = !settings.categories.iter().any(|category| category == name);
        if added {
            settings.categories.push(name.to_owned());
            self.store.save_settings(&settings);
        }

        for user in self.store.users() {
            let wanted = user.is_staff()
                && assigned.contains(&user.username)
                && !user.depts.iter().any(|dept| dept == name);
            if wanted {
                self.store
                    .update_user(user.id, |user| user.depts.push(name.to_owned()));
            }
        }

        if added {
            let actor = self.actor.display_name().to_owned();
            self.store
                .log_global(&actor, "Kategorie erstellt", Some(name.to_owned()));
            tracing::info!(category = name, "category added");
        }
        added
    }

    /// Rename a category and resync the staff assignment.
    ///
    /// Assigned staff keep or gain the category under its new name;
    /// everyone else loses it. Renaming a category to itself is how
    /// the assignment alone gets edited. Returns `true` when the
    /// settings list held the old name.
    pub fn rename_category(&mut self, old: &str, new: &str, assigned: &[Username]) -> bool {
        let new = new.trim();
        if new.is_empty() {
            return false;
        }

        let mut settings = self.store.settings();
        let renamed = if let Some(slot) = settings
            .categories
            .iter_mut()
            .find(|category| category.as_str() == old)
        {
            *slot = new.to_owned();
            true
        } else {
            false
        };
        if renamed {
            self.store.save_settings(&settings);
        }

        for user in self.store.users() {
            if !user.is_staff() {
                continue;
            }
            let has_old = user.depts.iter().any(|dept| dept == old);
            let keep = assigned.contains(&user.username);
            if has_old && keep {
                self.store.update_user(user.id, |user| {
                    if let Some(slot) = user.depts.iter_mut().find(|dept| dept.as_str() == old) {
                        *slot = new.to_owned();
                    }
                });
            } else if has_old {
                self.store
                    .update_user(user.id, |user| user.depts.retain(|dept| dept != old));
            } else if keep {
                self.store
                    .update_user(user.id, |user| user.depts.push(new.to_owned()));
            }
        }

        if renamed && old != new {
            let actor = self.actor.display_name().to_owned();
            self.store.log_global(
                &actor,
                "Kategorie umbenannt",
                Some(format!("{old} zu {new}")),
            );
            tracing::info!(from = old, to = new, "category renamed");
        }
        renamed
    }

    /// Remove a category from the settings list.
    ///
    /// Tickets filed under it and staff departments naming it keep the
    /// dangling reference; only the list shrinks. Returns `false` when
    /// the name was not on it.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let mut settings = self.store.settings();
        let before = settings.categories.len();
        settings.categories.retain(|category| category != name);
        if settings.categories.len() == before {
            return false;
        }
        self.store.save_settings(&settings);

        let actor = self.actor.display_name().to_owned();
        self.store
            .log_global(&actor, "Kategorie gelöscht", Some(name.to_owned()));
        tracing::info!(category = name, "category deleted");
        true
    }
}

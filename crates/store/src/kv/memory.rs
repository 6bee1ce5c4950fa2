//! In-memory backend.

use std::collections::HashMap;

use super::KeyValueStore;

/// A [`KeyValueStore`] held entirely in a `HashMap`.
///
/// Backs tests and ephemeral sessions; contents vanish on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut kv = MemoryStore::new();
        assert_eq!(kv.get("a"), None);

        kv.set("a", "1");
        assert_eq!(kv.get("a"), Some("1".to_owned()));

        kv.set("a", "2");
        assert_eq!(kv.get("a"), Some("2".to_owned()));

        kv.remove("a");
        assert_eq!(kv.get("a"), None);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut kv = MemoryStore::new();
        kv.remove("missing");
        assert_eq!(kv.get("missing"), None);
    }
}

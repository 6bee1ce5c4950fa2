//! Key-value backends.
//!
//! Everything the application persists goes through the small
//! [`KeyValueStore`] trait: string keys to string values, no
//! transactions, no iteration. [`MemoryStore`] backs tests and
//! ephemeral sessions, [`FileStore`] maps each key to a JSON file
//! on disk.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Minimal string-keyed storage contract.
///
/// Implementations are infallible at this interface: a failed read
/// reads as an absent value, a failed write is logged and dropped.
pub trait KeyValueStore {
    /// Fetch the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete the value under `key`, if any.
    fn remove(&mut self, key: &str);
}

/// Read a JSON value from `kv`, falling back when the key is absent or
/// the stored text does not parse. Parse failures are logged and
/// treated as absence.
pub fn read_json<T, F>(kv: &dyn KeyValueStore, key: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match kv.get(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable stored value");
                fallback()
            }
        },
        None => fallback(),
    }
}

/// Serialize `value` to JSON and store it under `key`.
///
/// The domain records always serialize; if one ever does not, the
/// write is logged and skipped rather than propagated.
pub fn write_json<T: Serialize>(kv: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => kv.set(key, &raw),
        Err(e) => tracing::warn!(key, error = %e, "failed to serialize value, write skipped"),
    }
}

//! File-backed backend.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::KeyValueStore;

/// A [`KeyValueStore`] that maps each key to `<dir>/<key>.json`.
///
/// Writes are best-effort: an I/O failure is logged and the value is
/// not persisted, mirroring how reads treat an unreadable file as an
/// absent value.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// created.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory this store reads and writes.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        if is_valid_key(key) {
            Some(self.dir.join(format!("{key}.json")))
        } else {
            tracing::warn!(key, "rejecting key unsafe for a filename");
            None
        }
    }
}

/// Keys become filenames, so only ASCII alphanumerics and underscores
/// are allowed.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "failed to read stored value");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(path) = self.path_for(key) else {
            return;
        };
        if let Err(e) = fs::write(&path, value) {
            tracing::warn!(key, path = %path.display(), error = %e, "failed to persist value");
        }
    }

    fn remove(&mut self, key: &str) {
        let Some(path) = self.path_for(key) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(key, path = %path.display(), error = %e, "failed to remove stored value");
        }
    }
}

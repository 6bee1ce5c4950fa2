//! Integration tests for Kummerkasten.
//!
//! Unit tests in the library crates run against the in-memory backend;
//! the tests here work a real file-backed profile in a temporary
//! directory, covering the full startup pipeline (migration, seeding,
//! archive sweep) and the dashboard/admin controllers on top of it -
//! the closest thing to a browser session this workspace has.
//!
//! Run with: cargo test -p kummerkasten-integration-tests
//!
//! # Test Categories
//!
//! - `store_startup` - On-disk init: legacy migration, seeding, sweep
//! - `ticket_lifecycle` - Submit, work, chat, close, archive, reactivate
//! - `admin_panel` - Account requests, user manager, CSV, categories

use std::path::Path;

use kummerkasten_store::{Store, StoreConfig};
use tempfile::TempDir;

/// One isolated profile directory, cleaned up on drop.
///
/// Opening the profile twice simulates two page loads (or two
/// processes) over the same browser profile.
pub struct TestProfile {
    dir: TempDir,
    config: StoreConfig,
}

impl TestProfile {
    /// Create an empty profile in a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp directory");
        let config = StoreConfig {
            data_dir: dir.path().to_path_buf(),
            profile: "default".to_owned(),
        };
        Self { dir, config }
    }

    /// Open a store over this profile.
    ///
    /// # Panics
    ///
    /// Panics when the profile directory cannot be created.
    #[must_use]
    pub fn open(&self) -> Store {
        Store::open(&self.config).expect("failed to open store")
    }

    /// The directory holding this profile's `<key>.json` files.
    #[must_use]
    pub fn profile_dir(&self) -> std::path::PathBuf {
        self.config.profile_dir()
    }

    /// The data directory containing the profile.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write raw text under a storage key, bypassing the store.
    ///
    /// Used to plant legacy or corrupt data before the first open.
    ///
    /// # Panics
    ///
    /// Panics when the file cannot be written.
    pub fn plant(&self, key: &str, raw: &str) {
        let dir = self.profile_dir();
        std::fs::create_dir_all(&dir).expect("failed to create profile directory");
        std::fs::write(dir.join(format!("{key}.json")), raw).expect("failed to plant test data");
    }

    /// Read the raw text stored under a key, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.profile_dir().join(format!("{key}.json"))).ok()
    }
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize tracing for a test binary.
///
/// Defaults to info level for the workspace crates if `RUST_LOG` is not
/// set. Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kummerkasten_store=info,kummerkasten_admin=info".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

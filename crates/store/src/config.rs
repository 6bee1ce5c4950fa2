//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KUMMERKASTEN_DATA_DIR` - Directory holding all profiles (default: ./kummerkasten-data)
//! - `KUMMERKASTEN_PROFILE` - Profile name, one isolated data set (default: default)

use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = "./kummerkasten-data";
const DEFAULT_PROFILE: &str = "default";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storage configuration.
///
/// A profile is one self-contained data set; switching profiles
/// switches to a sibling directory under the same data root.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding all profiles.
    pub data_dir: PathBuf,
    /// Active profile name.
    pub profile: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the profile name contains characters
    /// unsafe for a directory name.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default(
            "KUMMERKASTEN_DATA_DIR",
            DEFAULT_DATA_DIR,
        ));
        let profile = get_env_or_default("KUMMERKASTEN_PROFILE", DEFAULT_PROFILE);
        validate_profile(&profile)?;

        Ok(Self { data_dir, profile })
    }

    /// Directory holding the active profile's files.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.data_dir.join(&self.profile)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            profile: DEFAULT_PROFILE.to_owned(),
        }
    }
}

/// Profile names become directory names.
fn validate_profile(profile: &str) -> Result<(), ConfigError> {
    let valid = !profile.is_empty()
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "KUMMERKASTEN_PROFILE".to_owned(),
            format!("profile name must be alphanumeric, '-' or '_': {profile}"),
        ))
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_profile_accepts_simple_names() {
        assert!(validate_profile("default").is_ok());
        assert!(validate_profile("team-a_2").is_ok());
    }

    #[test]
    fn test_validate_profile_rejects_path_characters() {
        assert!(validate_profile("").is_err());
        assert!(validate_profile("../escape").is_err());
        assert!(validate_profile("has space").is_err());
        assert!(validate_profile("a/b").is_err());
    }

    #[test]
    fn test_profile_dir_joins_data_dir_and_profile() {
        let config = StoreConfig {
            data_dir: PathBuf::from("/tmp/kummerkasten"),
            profile: "team-a".to_owned(),
        };
        assert_eq!(
            config.profile_dir(),
            PathBuf::from("/tmp/kummerkasten/team-a")
        );
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.profile, "default");
        assert_eq!(config.data_dir, PathBuf::from("./kummerkasten-data"));
    }
}

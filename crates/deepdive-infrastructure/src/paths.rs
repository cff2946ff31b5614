//! Unified path management for Deep Dive files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/deepdive/          # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/deepdive/     # Data directory
//! └── store/                   # One JSON file per store key
//!     ├── deep_dive_active_session.json
//!     └── deep_dive_history.json
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "deepdive";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for deepdive_core::DeepDiveError {
    fn from(err: PathError) -> Self {
        deepdive_core::DeepDiveError::config(err.to_string())
    }
}

/// Resolves where configuration and session data live.
pub struct DeepDivePaths;

impl DeepDivePaths {
    /// Returns the configuration directory (e.g. `~/.config/deepdive/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g. `~/.local/share/deepdive/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Directory holding the key-value store files.
    ///
    /// `override_dir` comes from `storage.data_dir` in the config.
    pub fn store_dir(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
        match override_dir {
            Some(dir) => Ok(dir.join("store")),
            None => Ok(Self::data_dir()?.join("store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_dir_honors_override() {
        let dir = DeepDivePaths::store_dir(Some(Path::new("/tmp/dd"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/dd/store"));
    }

    #[test]
    fn test_config_file_name() {
        if let Ok(path) = DeepDivePaths::config_file() {
            assert!(path.ends_with("deepdive/config.toml"));
        }
    }
}

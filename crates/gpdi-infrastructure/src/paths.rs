//! Unified path management for Gpd-i files.
//!
//! Platform defaults come from the `dirs` crate (XDG on Linux, the usual
//! application folders on macOS and Windows).

use gpdi_core::GpdiError;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gpdi";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
    /// The platform data directory could not be determined.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for GpdiError {
    fn from(err: PathError) -> Self {
        GpdiError::config(err.to_string())
    }
}

/// Platform default locations.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/gpdi/              # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/gpdi/         # Data directory (see `DataDir`)
/// ├── database.json            # Knowledge base
/// ├── chats/                   # One file per conversation
/// └── logs/                    # Application logs
///     └── gpdi.log.YYYY-MM-DD
/// ```
pub struct GpdiPaths;

impl GpdiPaths {
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

/// Layout of everything the application writes below one data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `override_root` when given, the platform data directory otherwise.
    pub fn resolve(override_root: Option<&Path>) -> Result<Self, PathError> {
        match override_root {
            Some(root) => Ok(Self::new(root)),
            None => Ok(Self::new(GpdiPaths::data_dir()?)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn knowledge_file(&self) -> PathBuf {
        self.root.join("database.json")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("chats")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Creates the root, session and log directories.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.sessions_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_file() {
        // Not every CI sandbox has a home directory.
        if let Ok(config_file) = GpdiPaths::config_file() {
            assert!(config_file.ends_with("gpdi/config.toml"));
        }
    }

    #[test]
    fn test_data_dir_layout() {
        let data = DataDir::new("/srv/gpdi");
        assert_eq!(data.knowledge_file(), PathBuf::from("/srv/gpdi/database.json"));
        assert_eq!(data.sessions_dir(), PathBuf::from("/srv/gpdi/chats"));
        assert_eq!(data.logs_dir(), PathBuf::from("/srv/gpdi/logs"));
    }

    #[test]
    fn test_resolve_prefers_override() {
        let data = DataDir::resolve(Some(Path::new("/tmp/elsewhere"))).unwrap();
        assert_eq!(data.root(), Path::new("/tmp/elsewhere"));
    }

    #[test]
    fn test_ensure_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path().join("nested"));
        data.ensure().unwrap();

        assert!(data.sessions_dir().is_dir());
        assert!(data.logs_dir().is_dir());
        assert!(!data.knowledge_file().exists());
    }
}

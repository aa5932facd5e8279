//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml`, writing a file with the
//! defaults on first run so users have something to edit.

use crate::paths::GpdiPaths;
use crate::storage::{AtomicFile, AtomicFileError};
use gpdi_core::config::RootConfig;
use gpdi_core::{GpdiError, Result};
use std::path::{Path, PathBuf};

pub struct ConfigService {
    file: AtomicFile<RootConfig>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::toml(path.into()),
        }
    }

    /// Uses the platform config file (e.g. `~/.config/gpdi/config.toml`).
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(GpdiPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads and validates the configuration.
    ///
    /// A missing file is created with the defaults. A file that cannot be
    /// parsed or fails validation is reported as `GpdiError::Config` and left
    /// untouched.
    pub fn load(&self) -> Result<RootConfig> {
        let config = match self.file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = RootConfig::default();
                self.save(&config)?;
                tracing::info!(path = %self.path().display(), "Wrote default configuration");
                config
            }
            Err(AtomicFileError::ParseError { message, .. }) => {
                return Err(GpdiError::config(format!(
                    "{}: {}",
                    self.path().display(),
                    message
                )));
            }
            Err(e) => return Err(GpdiError::io(e.to_string())),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &RootConfig) -> Result<()> {
        self.file
            .save(config)
            .map_err(|e| GpdiError::io(format!("{}: {}", self.path().display(), e)))
    }
}

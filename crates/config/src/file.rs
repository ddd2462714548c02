//! The config file on disk
//!
//! Reads tolerate out-of-range values so a user can still fix them by hand;
//! `Config::validate` reports them. Writes refuse them. A write lands in one
//! rename, and the file it replaces is kept next to it as `config.toml.backup`.

use crate::{Config, ConfigError, ConfigResult, ValidationError, CONFIG_VERSION};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Parsed contents, or `None` when there is no file yet
    ///
    /// An empty file is an error rather than a silent reset to defaults.
    pub(crate) fn read(&self) -> ConfigResult<Option<Config>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.path.clone(),
                source: std::io::Error::new(ErrorKind::InvalidData, "file is empty"),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: self.path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "{} is format version {}, newer than {}; unknown keys are ignored",
                self.path.display(),
                config.version,
                CONFIG_VERSION
            );
        }
        if let Err(errors) = config.validate() {
            log::warn!("{}: {}", self.path.display(), describe(&errors));
        }

        Ok(Some(config))
    }

    /// Replaces the file with `header` followed by `config`
    ///
    /// Returns where the previous file was copied, if there was one.
    pub(crate) fn write(&self, config: &Config, header: &str) -> ConfigResult<Option<PathBuf>> {
        config
            .validate()
            .map_err(|errors| ConfigError::ValidationError(describe(&errors)))?;
        let body = toml::to_string_pretty(config)?;

        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: format!("{} has no parent directory", self.path.display()),
            })?;
        fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreationError {
            path: dir.to_path_buf(),
            source,
        })?;

        let backup = if self.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|source| ConfigError::BackupError { source })?;
            log::debug!("Kept previous config as {}", backup.display());
            Some(backup)
        } else {
            None
        };

        // Staged in the same directory so the rename cannot cross filesystems
        let mut staged = NamedTempFile::new_in(dir)?;
        write!(staged, "{}\n\n{}", header, body)?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|e| ConfigError::WriteError {
                path: self.path.clone(),
                source: e.error,
            })?;

        log::info!("Wrote {}", self.path.display());
        Ok(backup)
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

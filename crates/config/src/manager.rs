//! Locating, loading and initialising the config file

use crate::file::ConfigFile;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "config.toml";

const DEFAULT_HEADER: &str = "\
# shelfplay configuration
# Environment overrides: SHELFPLAY_SERVER_URL, SHELFPLAY_SERVER_TOKEN,
# SHELFPLAY_PLAYER_SYNC_INTERVAL_SECS, SHELFPLAY_APP_LOG_LEVEL";

/// What `ConfigManager::initialize` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Wrote defaults where there was no file
    Created,
    /// Left the existing file alone
    Existing,
    /// Overwrote the file with defaults; the old one is at `backup`
    Replaced { backup: PathBuf },
}

/// Entry point for the config file in one directory
pub struct ConfigManager {
    config_dir: PathBuf,
    file: ConfigFile,
}

impl ConfigManager {
    /// Uses the platform config directory
    ///
    /// `~/.config/shelfplay` on Linux, `~/Library/Application Support/shelfplay`
    /// on macOS, `%APPDATA%\shelfplay\config` on Windows.
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "shelfplay").ok_or_else(|| {
            ConfigError::PathResolutionError {
                reason: "no home directory for this user".to_string(),
            }
        })?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let file = ConfigFile::new(config_dir.join(FILE_NAME));
        Ok(Self { config_dir, file })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// The file's settings, or defaults when there is no file
    pub fn load(&self) -> ConfigResult<Config> {
        match self.file.read()? {
            Some(config) => Ok(config),
            None => {
                log::debug!("No config at {}, using defaults", self.file.path().display());
                Ok(Config::default())
            }
        }
    }

    /// Loads the config file and applies `SHELFPLAY_*` environment overrides
    ///
    /// Recognised variables: `SHELFPLAY_SERVER_URL`, `SHELFPLAY_SERVER_TOKEN`,
    /// `SHELFPLAY_PLAYER_SYNC_INTERVAL_SECS` and `SHELFPLAY_APP_LOG_LEVEL`.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

        if let Err(errors) = config.validate() {
            log::warn!("Invalid settings after environment overrides: {:?}", errors);
        }
        Ok(config)
    }

    /// Writes an annotated default file
    ///
    /// An existing file is kept unless `overwrite` is set, in which case it is
    /// backed up first.
    pub fn initialize(&self, overwrite: bool) -> ConfigResult<InitOutcome> {
        if self.file.exists() && !overwrite {
            return Ok(InitOutcome::Existing);
        }
        let outcome = match self.file.write(&Config::default(), DEFAULT_HEADER)? {
            Some(backup) => InitOutcome::Replaced { backup },
            None => InitOutcome::Created,
        };
        Ok(outcome)
    }

    /// Every problem with the file's values, empty when it is valid
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let problems = match self.load()?.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        };
        Ok(problems)
    }
}

/// Applies overrides from `lookup`, which maps a variable name to its value
pub(crate) fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("SHELFPLAY_SERVER_URL") {
        config.server.base_url = url;
    }

    if let Some(token) = lookup("SHELFPLAY_SERVER_TOKEN") {
        config.server.token = token;
    }

    if let Some(raw) = lookup("SHELFPLAY_PLAYER_SYNC_INTERVAL_SECS") {
        config.player.sync_interval_secs =
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidOverride {
                    variable: "SHELFPLAY_PLAYER_SYNC_INTERVAL_SECS".to_string(),
                    value: raw.clone(),
                })?;
    }

    if let Some(raw) = lookup("SHELFPLAY_APP_LOG_LEVEL") {
        config.app.log_level =
            raw.parse::<LogLevel>()
                .map_err(|_| ConfigError::InvalidOverride {
                    variable: "SHELFPLAY_APP_LOG_LEVEL".to_string(),
                    value: raw.clone(),
                })?;
    }

    Ok(())
}

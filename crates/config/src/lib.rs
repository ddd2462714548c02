//! shelfplay configuration
//!
//! Each concern gets its own section type implementing `ConfigSection`, so
//! adding a setting never touches the loader.
//!
//! - **Graceful degradation**: invalid files load with warnings; saving refuses invalid values
//! - **Atomic writes**: config files are never left half-written
//! - **Override chain**: defaults < file < `SHELFPLAY_*` environment variables < CLI flags
//!
//! # Example
//!
//! ```rust,no_run
//! use shelfplay_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().expect("Failed to load config");
//! println!("Syncing every {}s", config.player.sync_interval_secs);
//! ```

mod error;
mod file;
mod manager;
mod validation;

// Config sections
pub mod app_config;
mod player_config;
mod server_config;
mod streaming_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{ConfigManager, InitOutcome};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use player_config::PlayerConfig;
pub use server_config::{ProgressTarget, ServerConfig, ITEM_PLACEHOLDER};
pub use streaming_config::StreamingConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Library server connection
    pub server: ServerConfig,

    /// Playback session behaviour
    pub player: PlayerConfig,

    /// Stream selection and adaptive streaming
    pub streaming: StreamingConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.server.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.streaming.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.server.merge(other.server);
        self.player.merge(other.player);
        self.streaming.merge(other.streaming);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            server: ServerConfig::default(),
            player: PlayerConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

//! Library server connection section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the item id in path templates
pub const ITEM_PLACEHOLDER: &str = "{item_id}";

/// Which progress endpoint receives pushes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressTarget {
    /// `primary_progress_path`
    #[default]
    Primary,
    /// `alternate_progress_path`
    Alternate,
}

impl std::fmt::Display for ProgressTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressTarget::Primary => write!(f, "primary"),
            ProgressTarget::Alternate => write!(f, "alternate"),
        }
    }
}

/// Server endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the library server
    pub base_url: String,

    /// Bearer token; empty means unauthenticated
    pub token: String,

    /// Endpoint used for progress pushes
    pub progress_target: ProgressTarget,

    pub primary_progress_path: String,
    pub alternate_progress_path: String,

    /// Item detail path template
    pub item_path: String,

    /// Adaptive manifest path template
    pub manifest_path: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Retries for idempotent reads
    pub max_retries: u32,
}

impl ServerConfig {
    /// Returns the path template of the selected progress target
    pub fn progress_path(&self) -> &str {
        match self.progress_target {
            ProgressTarget::Primary => &self.primary_progress_path,
            ProgressTarget::Alternate => &self.alternate_progress_path,
        }
    }

    /// Returns the token, or `None` when it is blank
    pub fn bearer(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:13378".to_string(),
            token: String::new(),
            progress_target: ProgressTarget::Primary,
            primary_progress_path: "/api/me/progress/{item_id}".to_string(),
            alternate_progress_path: "/api/session/local/{item_id}/sync".to_string(),
            item_path: "/api/items/{item_id}?expanded=1".to_string(),
            manifest_path: "/hls/{item_id}/output.m3u8".to_string(),
            request_timeout_secs: 10,
            max_retries: 2,
        }
    }
}

impl ConfigSection for ServerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::not_empty(&self.base_url, "server.base_url"),
            Validator::http_url(&self.base_url, "server.base_url"),
            Validator::has_placeholder(
                &self.primary_progress_path,
                ITEM_PLACEHOLDER,
                "server.primary_progress_path",
            ),
            Validator::has_placeholder(
                &self.alternate_progress_path,
                ITEM_PLACEHOLDER,
                "server.alternate_progress_path",
            ),
            Validator::has_placeholder(&self.item_path, ITEM_PLACEHOLDER, "server.item_path"),
            Validator::has_placeholder(
                &self.manifest_path,
                ITEM_PLACEHOLDER,
                "server.manifest_path",
            ),
            Validator::in_range(
                self.request_timeout_secs,
                1,
                120,
                "server.request_timeout_secs",
            ),
            Validator::in_range(self.max_retries, 0, 10, "server.max_retries"),
        ])
        .map_err(|mut errors| {
            // An empty URL also fails the scheme check; report it once
            errors.dedup_by(|a, b| a.field == b.field && a.field == "server.base_url");
            errors
        })
    }

    fn merge(&mut self, other: Self) {
        self.base_url = other.base_url;
        self.token = other.token;
        self.progress_target = other.progress_target;
        self.primary_progress_path = other.primary_progress_path;
        self.alternate_progress_path = other.alternate_progress_path;
        self.item_path = other.item_path;
        self.manifest_path = other.manifest_path;
        self.request_timeout_secs = other.request_timeout_secs;
        self.max_retries = other.max_retries;
    }

    fn section_name(&self) -> &'static str {
        "server"
    }
}

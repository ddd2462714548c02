// crates/sync-engine/src/error.rs
//! Error types for progress sync

use shelfplay_core::AppError;
use shelfplay_network::GatewayError;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while pushing progress
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sink rejected or failed the write
    #[error("Progress push failed: {0}")]
    Push(String),

    /// The synchronizer was stopped
    #[error("Synchronizer retired")]
    Retired,
}

impl From<GatewayError> for SyncError {
    fn from(err: GatewayError) -> Self {
        SyncError::Push(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        AppError::TransientSyncFailure {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfplay_core::ErrorSeverity;

    #[test]
    fn test_error_display() {
        let err = SyncError::Push("HTTP 502".to_string());
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_maps_to_silent_app_error() {
        let app: AppError = SyncError::Push("timeout".to_string()).into();
        assert_eq!(app.severity(), ErrorSeverity::Recoverable);
        assert!(!app.is_user_visible());
    }
}

// FILE: crates/media-engine/src/error.rs

use shelfplay_core::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Why a stream could not be acquired or kept playing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// No rendition this runtime can play
    #[error("Stream not supported: {0}")]
    NotSupported(String),

    /// Network or server failure; `reconnect` says whether re-opening may help
    #[error("Stream unavailable: {reason}")]
    Unavailable { reason: String, reconnect: bool },

    /// The adaptive session was torn down
    #[error("Stream released")]
    Released,
}

pub type StreamResult<T> = Result<T, StreamError>;

impl StreamError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StreamError::Unavailable {
            reason: reason.into(),
            reconnect: true,
        }
    }
}

/// Malformed HLS playlist
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManifestError {
    #[error("Playlist does not start with #EXTM3U")]
    MissingHeader,

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Playlist lists no segments or variants")]
    Empty,
}

impl From<StreamError> for AppError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::NotSupported(reason) => AppError::stream_unsupported(reason),
            StreamError::Unavailable { reason, reconnect } => AppError::StreamUnavailable {
                kind: shelfplay_core::StreamFailureKind::NetworkFault,
                reason,
                reconnect,
            },
            StreamError::Released => AppError::Cancelled {
                operation: "stream".to_string(),
            },
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Stream(e) => e.into(),
            EngineError::Manifest(e) => AppError::stream_fault(e.to_string()),
            EngineError::InvalidArgument { argument, reason } => {
                AppError::InvalidArgument { argument, reason }
            }
            other => AppError::InvalidArgument {
                argument: "session".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfplay_core::RecoveryAction;

    #[test]
    fn test_unsupported_maps_to_user_intervention() {
        let app: AppError = StreamError::NotSupported("no direct file".to_string()).into();
        assert_eq!(app.recovery_action(), RecoveryAction::UserIntervention);
    }

    #[test]
    fn test_unavailable_keeps_reconnect_hint() {
        let app: AppError = StreamError::unavailable("segment 3 failed").into();
        assert_eq!(app.recovery_action(), RecoveryAction::ReopenSession);
    }

    #[test]
    fn test_manifest_error_display() {
        let err = ManifestError::InvalidLine {
            line: 4,
            reason: "bad EXTINF".to_string(),
        };
        assert_eq!(err.to_string(), "Line 4: bad EXTINF");
    }
}

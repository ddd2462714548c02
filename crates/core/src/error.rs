//! Error taxonomy and recovery strategies for shelfplay
//!
//! Errors are classified by how far they are allowed to travel:
//! - **Recoverable**: handled where they happen (progress sync failures,
//!   segment fetch retries) and never shown to the user
//! - **Fatal**: end the current session attempt and are shown with a retry action
//!
//! Each error includes a recovery action to guide automatic error handling.

use std::fmt;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Let the next periodic tick carry the work (progress sync)
    WaitForNextTick,
    /// Retry with exponential backoff (segment fetches)
    RetryWithBackoff,
    /// Re-open the session from scratch with a fresh stream handle
    ReopenSession,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitForNextTick => write!(f, "Waiting for next sync tick"),
            Self::RetryWithBackoff => write!(f, "Retrying with backoff"),
            Self::ReopenSession => write!(f, "Re-opening session"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Recovered locally; never surfaced
    Recoverable,
    /// Ends the current session attempt; surfaced with a retry action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Why a stream could not be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFailureKind {
    /// No rendition this client can play
    NotSupported,
    /// The server or the network failed
    NetworkFault,
}

impl fmt::Display for StreamFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "not supported"),
            Self::NetworkFault => write!(f, "network fault"),
        }
    }
}

/// Main error type for shelfplay sessions
#[derive(Error, Debug)]
pub enum AppError {
    /// Item detail missing or unreachable
    #[error("Failed to initialize session for {item_id}: {reason}")]
    InitializationFailure { item_id: String, reason: String },

    /// The stream for the current attempt cannot be played
    #[error("Stream unavailable ({kind}): {reason}")]
    StreamUnavailable {
        kind: StreamFailureKind,
        reason: String,
        /// Re-opening the session may succeed
        reconnect: bool,
    },

    /// A progress push failed
    #[error("Progress sync failed: {reason}")]
    TransientSyncFailure { reason: String },

    /// A segment fetch failed and will be retried
    #[error("Transient stream fault on attempt {attempt}: {reason}")]
    TransientStreamFault { reason: String, attempt: usize },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// Operation cancelled because the session went away
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TransientSyncFailure { .. }
            | Self::TransientStreamFault { .. }
            | Self::Cancelled { .. } => ErrorSeverity::Recoverable,

            Self::InitializationFailure { .. }
            | Self::StreamUnavailable { .. }
            | Self::InvalidArgument { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::TransientSyncFailure { .. } | Self::Cancelled { .. } => {
                RecoveryAction::WaitForNextTick
            }
            Self::TransientStreamFault { .. } => RecoveryAction::RetryWithBackoff,
            Self::InitializationFailure { .. } => RecoveryAction::ReopenSession,
            Self::StreamUnavailable {
                reconnect: true, ..
            } => RecoveryAction::ReopenSession,
            Self::StreamUnavailable { .. } | Self::InvalidArgument { .. } => {
                RecoveryAction::UserIntervention
            }
        }
    }

    /// Returns true if the error may be shown to the user
    pub fn is_user_visible(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::InitializationFailure { .. } => {
                "Could not load this audiobook from the server. Tap to retry.".to_string()
            }
            Self::StreamUnavailable {
                kind: StreamFailureKind::NotSupported,
                ..
            } => "This audiobook's audio format is not supported by this player.".to_string(),
            Self::StreamUnavailable {
                kind: StreamFailureKind::NetworkFault,
                ..
            } => "Lost connection to the audio stream. Tap to retry.".to_string(),
            Self::TransientSyncFailure { .. } | Self::TransientStreamFault { .. } => {
                "Reconnecting...".to_string()
            }
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
            Self::Cancelled { .. } => "Operation was cancelled.".to_string(),
        }
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::WaitForNextTick | RecoveryAction::RetryWithBackoff
        )
    }

    /// Helper to build a network-fault stream error
    pub fn stream_fault(reason: impl Into<String>) -> Self {
        Self::StreamUnavailable {
            kind: StreamFailureKind::NetworkFault,
            reason: reason.into(),
            reconnect: true,
        }
    }

    /// Helper to build an unsupported-stream error
    pub fn stream_unsupported(reason: impl Into<String>) -> Self {
        Self::StreamUnavailable {
            kind: StreamFailureKind::NotSupported,
            reason: reason.into(),
            reconnect: false,
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_action_display() {
        assert_eq!(
            RecoveryAction::RetryWithBackoff.to_string(),
            "Retrying with backoff"
        );
        assert_eq!(
            RecoveryAction::UserIntervention.to_string(),
            "User intervention required"
        );
    }

    #[test]
    fn test_sync_failures_are_silent() {
        let err = AppError::TransientSyncFailure {
            reason: "HTTP 502".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert!(!err.is_user_visible());
        assert_eq!(err.recovery_action(), RecoveryAction::WaitForNextTick);
    }

    #[test]
    fn test_stream_fault_escalation_is_fatal() {
        let err = AppError::stream_fault("segment 12 failed 4 times");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.recovery_action(), RecoveryAction::ReopenSession);
        assert!(err.user_message().contains("retry"));
    }

    #[test]
    fn test_unsupported_stream_message_differs_from_network_fault() {
        let unsupported = AppError::stream_unsupported("no direct rendition");
        let fault = AppError::stream_fault("timeout");
        assert_ne!(unsupported.user_message(), fault.user_message());
        assert_eq!(
            unsupported.recovery_action(),
            RecoveryAction::UserIntervention
        );
    }

    #[test]
    fn test_initialization_failure_display() {
        let err = AppError::InitializationFailure {
            item_id: "li_1".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(err.to_string().contains("li_1"));
        assert!(err.is_user_visible());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Recoverable < ErrorSeverity::Fatal);
    }
}

//! Session state machine states

use std::fmt;

/// Where a playback session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing opened yet
    #[default]
    Idle,
    /// Fetching item detail and progress, acquiring the stream
    Initializing,
    /// Stream acquired and positioned at the resume point
    Ready,
    Playing,
    Paused,
    /// Paused by the sleep timer
    Suspended,
    /// The attempt failed; carries the user-facing message
    Error(String),
    Closed,
}

impl SessionState {
    /// States in which a transport exists
    pub fn has_transport(&self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Playing | SessionState::Paused | SessionState::Suspended
        )
    }

    /// States from which `play` is accepted
    pub fn can_play(&self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Paused | SessionState::Suspended
        )
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, SessionState::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SessionState::Error(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Initializing => write!(f, "loading"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Suspended => write!(f, "sleeping"),
            SessionState::Error(message) => write!(f, "error: {}", message),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

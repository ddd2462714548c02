//! Media Engine - playback sessions for shelfplay
//!
//! `SessionController` turns a remote library item into a resumable,
//! chapter-aware listening session:
//! - `stream` picks the adaptive manifest or the direct file and prepares it
//! - `transport` is the seam to whatever renders audio (`headless` keeps time only)
//! - `chapters` and `sleep_timer` track where the listener is and when to stop
//! - progress goes to the server through `shelfplay-sync-engine`

mod chapters;
mod error;
mod events;
mod headless;
mod manifest;
mod now_playing;
mod session;
mod sleep_timer;
mod state;
mod stream;
mod transport;

pub use chapters::{ChapterIndex, ChapterPosition, BOUNDARY_TOLERANCE_SECS};
pub use error::{EngineError, EngineResult, ManifestError, StreamError, StreamResult};
pub use events::{SessionEvent, SessionEvents};
pub use headless::{HeadlessTransport, HeadlessTransportFactory};
pub use manifest::{parse_playlist, select_variant, MediaPlaylist, MediaSegment, Playlist, Variant};
pub use now_playing::{NoopPublisher, NowPlayingInfo, NowPlayingPublisher, RemoteAction};
pub use session::{SessionController, SessionServices, SessionSettings, SessionSnapshot};
pub use sleep_timer::{ChapterChange, SleepTimer, SleepTimerState, MAX_SLEEP_CHAPTERS};
pub use state::SessionState;
pub use stream::{
    AdaptiveSession, PlaybackCapabilities, StreamAcquirer, StreamHandle, StreamSettings,
    StreamStrategy,
};
pub use transport::{Transport, TransportEvent, TransportEvents, TransportFactory};
pub use shelfplay_core::PlaybackRate;

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _ = SessionState::Idle;
        let _ = ChapterIndex::build(&[], 0.0);
        let _ = SleepTimer::new(0.5);
        let _ = RemoteAction::NextChapter;
    }

    #[test]
    fn test_error_display() {
        let error = EngineError::InvalidState("closed".to_string());
        assert!(format!("{}", error).contains("closed"));
    }
}

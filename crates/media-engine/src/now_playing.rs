//! Platform now-playing integration
//!
//! The controller pushes what is playing to an injected publisher and accepts
//! the platform's remote-control buttons as `RemoteAction`s.

use serde::{Deserialize, Serialize};

/// What the platform shows for the current session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub title: String,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub series: Option<String>,
    /// Server-relative cover path
    pub artwork: Option<String>,
    pub chapter_title: Option<String>,
    pub duration: f64,
    pub position: f64,
    pub rate: f32,
    pub is_playing: bool,
}

/// Receives now-playing updates
///
/// Called on state transitions and chapter changes, not on every tick.
pub trait NowPlayingPublisher: Send + Sync {
    fn publish(&self, info: &NowPlayingInfo);

    /// The session ended; remove any platform display
    fn clear(&self);
}

/// Publisher for runtimes without a now-playing surface
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl NowPlayingPublisher for NoopPublisher {
    fn publish(&self, _info: &NowPlayingInfo) {}

    fn clear(&self) {}
}

/// Remote-control commands from the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RemoteAction {
    Play,
    Pause,
    /// Absolute position in seconds
    SeekTo(f64),
    /// Relative jump in seconds, negative for backward
    SeekBy(f64),
    PreviousChapter,
    NextChapter,
}

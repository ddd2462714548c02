//! The playable media resource behind a session
//!
//! A transport owns whatever actually renders audio. It takes commands from the
//! session controller and reports back through `TransportEvents`.

use crate::error::{EngineResult, StreamError};
use crate::events::{SessionEvent, SessionEventKind};
use crate::stream::StreamHandle;
use shelfplay_core::PlaybackRate;
use tokio::sync::mpsc;

/// What a transport reports
///
/// `seek` is the number of the last seek the transport had applied when it
/// produced the report. Reports from before the controller's latest seek are stale.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Current position in seconds
    Position { seconds: f64, seek: u64 },
    /// Playback reached the end of the item
    Ended { seek: u64 },
    /// The stream broke mid-playback
    Failed(StreamError),
}

/// Event sender bound to one session attempt
#[derive(Debug, Clone)]
pub struct TransportEvents {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl TransportEvents {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    /// Returns false once the controller is gone
    pub fn send(&self, event: TransportEvent) -> bool {
        self.tx
            .send(SessionEvent::new(
                self.generation,
                SessionEventKind::Transport(event),
            ))
            .is_ok()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Commands a session issues to its transport
pub trait Transport: Send {
    fn play(&mut self) -> EngineResult<()>;

    fn pause(&mut self) -> EngineResult<()>;

    /// Moves to `position` seconds and reports it promptly
    ///
    /// `seek` numbers the request; every later report carries it.
    fn seek(&mut self, position: f64, seek: u64) -> EngineResult<()>;

    fn set_rate(&mut self, rate: PlaybackRate) -> EngineResult<()>;

    /// Last known position
    fn position(&self) -> f64;

    /// Frees the resource; no events follow
    fn release(&mut self);
}

/// Builds a transport for an acquired stream
pub trait TransportFactory: Send + Sync {
    fn create(
        &self,
        handle: &StreamHandle,
        duration: f64,
        events: TransportEvents,
    ) -> EngineResult<Box<dyn Transport>>;
}

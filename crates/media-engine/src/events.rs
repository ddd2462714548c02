//! The session's single inbound event channel
//!
//! Every asynchronous result (initialization, transport reports) is tagged with
//! the generation of the attempt that produced it. The controller drops events
//! from any generation but the live one.

use crate::stream::StreamHandle;
use crate::transport::TransportEvent;
use shelfplay_core::{AppError, LibraryItem, ProgressRecord};
use tokio::sync::mpsc;

/// Everything initialization produced
#[derive(Debug)]
pub(crate) struct Prepared {
    pub item: LibraryItem,
    pub progress: Option<ProgressRecord>,
    pub resume: f64,
    pub handle: StreamHandle,
}

#[derive(Debug)]
pub(crate) enum SessionEventKind {
    Initialized(Box<Result<Prepared, AppError>>),
    Transport(TransportEvent),
}

/// An event waiting to be applied by `SessionController::apply`
#[derive(Debug)]
pub struct SessionEvent {
    generation: u64,
    pub(crate) kind: SessionEventKind,
}

impl SessionEvent {
    pub(crate) fn new(generation: u64, kind: SessionEventKind) -> Self {
        Self { generation, kind }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The transport report carried by this event, if any
    pub fn transport_event(&self) -> Option<&TransportEvent> {
        match &self.kind {
            SessionEventKind::Transport(event) => Some(event),
            SessionEventKind::Initialized(_) => None,
        }
    }
}

/// Receiving half of the controller's event channel
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next event
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Next event if one is queued
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }
}

//! A transport that keeps time without rendering audio
//!
//! Position advances with the clock at the current rate and is reported every
//! tick. For adaptive streams the segments ahead of the playhead are fetched in
//! the background, so network faults surface exactly as they would for a real
//! player. Used by the CLI and by tests.

use crate::error::{EngineError, EngineResult, StreamError};
use crate::stream::{AdaptiveSession, StreamHandle};
use crate::transport::{Transport, TransportEvent, TransportEvents, TransportFactory};
use shelfplay_core::PlaybackRate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Commands sent to the clock task
#[derive(Debug, Clone, Copy)]
enum PlaybackCommand {
    Play,
    Pause,
    Seek(f64, u64),
    SetRate(f32),
}

pub struct HeadlessTransportFactory {
    tick: Duration,
    prefetch_segments: usize,
}

impl HeadlessTransportFactory {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            prefetch_segments: 3,
        }
    }

    /// Segments kept fetched ahead of the playhead for adaptive streams
    pub fn with_prefetch(mut self, segments: usize) -> Self {
        self.prefetch_segments = segments.max(1);
        self
    }
}

impl Default for HeadlessTransportFactory {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl TransportFactory for HeadlessTransportFactory {
    fn create(
        &self,
        handle: &StreamHandle,
        duration: f64,
        events: TransportEvents,
    ) -> EngineResult<Box<dyn Transport>> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(EngineError::InvalidArgument {
                argument: "duration".to_string(),
                reason: format!("{} is not a playable length", duration),
            });
        }
        Ok(Box::new(HeadlessTransport::start(
            handle,
            duration,
            events,
            self.tick,
            self.prefetch_segments,
        )))
    }
}

/// Clock-driven transport
pub struct HeadlessTransport {
    command_tx: mpsc::UnboundedSender<PlaybackCommand>,
    position: Arc<AtomicU64>,
    duration: f64,
    clock: Option<JoinHandle<()>>,
    prefetch: Option<JoinHandle<()>>,
}

impl HeadlessTransport {
    fn start(
        handle: &StreamHandle,
        duration: f64,
        events: TransportEvents,
        tick: Duration,
        prefetch_segments: usize,
    ) -> Self {
        let start = handle.start_offset.clamp(0.0, duration);
        let position = Arc::new(AtomicU64::new(start.to_bits()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (playhead_tx, playhead_rx) = watch::channel(start);

        let prefetch = handle.adaptive.clone().map(|session| {
            tokio::spawn(prefetch_loop(
                session,
                playhead_rx,
                prefetch_segments,
                events.clone(),
            ))
        });

        let clock = tokio::spawn(clock_loop(
            command_rx,
            events,
            Arc::clone(&position),
            playhead_tx,
            ClockSettings {
                start,
                duration,
                tick,
            },
        ));

        log::debug!(
            "Headless {} transport at {:.1}s of {:.1}s",
            handle.strategy,
            start,
            duration
        );

        Self {
            command_tx,
            position,
            duration,
            clock: Some(clock),
            prefetch,
        }
    }

    fn send_command(&self, cmd: PlaybackCommand) -> EngineResult<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| EngineError::Transport(format!("Failed to send command: {}", e)))
    }
}

impl Transport for HeadlessTransport {
    fn play(&mut self) -> EngineResult<()> {
        self.send_command(PlaybackCommand::Play)
    }

    fn pause(&mut self) -> EngineResult<()> {
        self.send_command(PlaybackCommand::Pause)
    }

    fn seek(&mut self, position: f64, seek: u64) -> EngineResult<()> {
        let position = position.clamp(0.0, self.duration);
        self.position.store(position.to_bits(), Ordering::Relaxed);
        self.send_command(PlaybackCommand::Seek(position, seek))
    }

    fn set_rate(&mut self, rate: PlaybackRate) -> EngineResult<()> {
        self.send_command(PlaybackCommand::SetRate(rate.value()))
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn release(&mut self) {
        for task in [self.clock.take(), self.prefetch.take()].into_iter().flatten() {
            task.abort();
        }
    }
}

impl Drop for HeadlessTransport {
    fn drop(&mut self) {
        self.release();
    }
}

struct ClockSettings {
    start: f64,
    duration: f64,
    tick: Duration,
}

async fn clock_loop(
    mut command_rx: mpsc::UnboundedReceiver<PlaybackCommand>,
    events: TransportEvents,
    shared_position: Arc<AtomicU64>,
    playhead: watch::Sender<f64>,
    settings: ClockSettings,
) {
    let duration = settings.duration;
    let mut ticker = interval(settings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut playing = false;
    let mut rate = 1.0_f64;
    let mut position = settings.start;
    let mut seek = 0_u64;
    let mut last = Instant::now();

    let publish = |seconds: f64, seek: u64| {
        shared_position.store(seconds.to_bits(), Ordering::Relaxed);
        playhead.send_replace(seconds);
        events.send(TransportEvent::Position { seconds, seek })
    };

    loop {
        tokio::select! {
            cmd = command_rx.recv() => {
                let Some(cmd) = cmd else { break };
                if playing {
                    let now = Instant::now();
                    position = (position + now.duration_since(last).as_secs_f64() * rate).min(duration);
                    last = now;
                    shared_position.store(position.to_bits(), Ordering::Relaxed);
                }
                match cmd {
                    PlaybackCommand::Play => {
                        if position < duration {
                            playing = true;
                            last = Instant::now();
                        }
                    }
                    PlaybackCommand::Pause => playing = false,
                    PlaybackCommand::Seek(target, id) => {
                        position = target.clamp(0.0, duration);
                        seek = id;
                        last = Instant::now();
                        if !publish(position, seek) {
                            break;
                        }
                    }
                    PlaybackCommand::SetRate(new_rate) => rate = f64::from(new_rate),
                }
            }
            _ = ticker.tick(), if playing => {
                let now = Instant::now();
                position = (position + now.duration_since(last).as_secs_f64() * rate).min(duration);
                last = now;

                if !publish(position, seek) {
                    break;
                }
                if position >= duration {
                    playing = false;
                    if !events.send(TransportEvent::Ended { seek }) {
                        break;
                    }
                }
            }
        }
    }
}

/// Keeps `ahead` segments fetched past the playhead
async fn prefetch_loop(
    session: AdaptiveSession,
    mut playhead: watch::Receiver<f64>,
    ahead: usize,
    events: TransportEvents,
) {
    // The acquirer primed the window at the start offset
    let mut fetched = session.window_at(*playhead.borrow(), ahead);

    loop {
        let wanted = session.window_at(*playhead.borrow_and_update(), ahead);
        let mut next = if wanted.start >= fetched.start && wanted.start <= fetched.end {
            fetched.end
        } else {
            wanted.start
        };

        while next < wanted.end {
            match session.fetch_segment(next).await {
                Ok(bytes) => log::trace!("Buffered segment {} ({} bytes)", next, bytes.len()),
                Err(StreamError::Released) => return,
                Err(e) => {
                    log::warn!("Adaptive stream failed: {}", e);
                    session.release();
                    events.send(TransportEvent::Failed(e));
                    return;
                }
            }
            next += 1;
        }
        fetched = wanted.start..next.max(wanted.end);

        if playhead.changed().await.is_err() {
            return;
        }
    }
}

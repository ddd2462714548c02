//! Playback session controller
//!
//! One state machine per opened item. The controller is owned by a single task
//! and mutated through `&mut self`; everything asynchronous (initialization,
//! transport reports) comes back through `SessionEvents` and is applied in
//! order with `apply`. Each open bumps the session generation, and events from
//! an older generation are dropped before they touch state.

use crate::chapters::{ChapterIndex, ChapterPosition};
use crate::error::{EngineError, EngineResult, StreamError};
use crate::events::{Prepared, SessionEvent, SessionEventKind, SessionEvents};
use crate::now_playing::{NowPlayingInfo, NowPlayingPublisher, RemoteAction};
use crate::sleep_timer::{ChapterChange, SleepTimer, SleepTimerState};
use crate::state::SessionState;
use crate::stream::{PlaybackCapabilities, StreamAcquirer, StreamHandle, StreamSettings, StreamStrategy};
use crate::transport::{Transport, TransportEvent, TransportEvents, TransportFactory};
use shelfplay_config::Config;
use shelfplay_core::{AppError, ItemId, ItemMetadata, LibraryItem, PlaybackRate, ProgressRecord};
use shelfplay_network::{MediaFetcher, MediaGateway};
use shelfplay_sync_engine::{
    ProgressPoll, ProgressSink, ProgressSynchronizer, PushReason, SyncConfig, SyncDrain, SyncStats,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Largest forward step between two reports still treated as continuous playback
const NATURAL_STEP_SECS: f64 = 10.0;

/// Collaborators a session talks to
#[derive(Clone)]
pub struct SessionServices {
    pub gateway: Arc<dyn MediaGateway>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub sink: Arc<dyn ProgressSink>,
    pub transports: Arc<dyn TransportFactory>,
    pub now_playing: Arc<dyn NowPlayingPublisher>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub auto_play: bool,
    pub resume_rewind_secs: f64,
    pub jump_forward_secs: f64,
    pub jump_backward_secs: f64,
    pub sleep_fire_epsilon_secs: f64,
    pub default_rate: PlaybackRate,
    pub sync: SyncConfig,
    pub capabilities: PlaybackCapabilities,
    pub stream: StreamSettings,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        let player = &config.player;
        let default_rate = PlaybackRate::new(player.default_rate).unwrap_or_else(|reason| {
            log::warn!("Ignoring player.default_rate: {}", reason);
            PlaybackRate::default()
        });

        Self {
            auto_play: player.auto_play,
            resume_rewind_secs: player.resume_rewind_secs as f64,
            jump_forward_secs: player.jump_forward_secs as f64,
            jump_backward_secs: player.jump_backward_secs as f64,
            sleep_fire_epsilon_secs: player.sleep_fire_epsilon_secs,
            default_rate,
            sync: SyncConfig::with_interval_secs(player.sync_interval_secs),
            capabilities: PlaybackCapabilities::from_config(&config.streaming),
            stream: StreamSettings::from_config(&config.streaming),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Read model for UIs
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub item_id: Option<ItemId>,
    pub metadata: Option<ItemMetadata>,
    pub position: f64,
    pub duration: f64,
    pub chapter: Option<ChapterPosition>,
    pub chapter_title: Option<String>,
    /// "3/15" style chapter counter
    pub chapter_progress: String,
    pub sleep: SleepTimerState,
    pub rate: PlaybackRate,
    pub strategy: Option<StreamStrategy>,
    pub is_finished: bool,
    pub sync: Option<SyncStats>,
}

pub struct SessionController {
    services: SessionServices,
    settings: SessionSettings,
    acquirer: StreamAcquirer,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    generation: u64,
    state: SessionState,
    last_error: Option<AppError>,
    item_id: Option<ItemId>,
    item: Option<LibraryItem>,
    chapters: ChapterIndex,
    current_chapter: Option<usize>,
    sleep: SleepTimer,
    position: f64,
    /// Number of the latest seek sent to the transport
    seek_seq: u64,
    playhead: watch::Sender<f64>,
    rate: PlaybackRate,
    handle: Option<StreamHandle>,
    transport: Option<Box<dyn Transport>>,
    sync: Option<ProgressSynchronizer>,
    init_task: Option<JoinHandle<()>>,
    resume_hint: Option<f64>,
}

impl SessionController {
    /// Creates an idle controller and the event stream it must be fed from
    pub fn new(services: SessionServices, settings: SessionSettings) -> (Self, SessionEvents) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let acquirer = StreamAcquirer::new(
            Arc::clone(&services.fetcher),
            settings.capabilities,
            settings.stream.clone(),
        );
        let (playhead, _) = watch::channel(0.0);

        let controller = Self {
            services,
            sleep: SleepTimer::new(settings.sleep_fire_epsilon_secs),
            rate: settings.default_rate,
            settings,
            acquirer,
            events_tx,
            generation: 0,
            state: SessionState::Idle,
            last_error: None,
            item_id: None,
            item: None,
            chapters: ChapterIndex::build(&[], 0.0),
            current_chapter: None,
            position: 0.0,
            seek_seq: 0,
            playhead,
            handle: None,
            transport: None,
            sync: None,
            init_task: None,
            resume_hint: None,
        };
        (controller, SessionEvents::new(events_rx))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn item(&self) -> Option<&LibraryItem> {
        self.item.as_ref()
    }

    pub fn chapters(&self) -> &ChapterIndex {
        &self.chapters
    }

    pub fn sleep_state(&self) -> SleepTimerState {
        self.sleep.state()
    }

    /// The failure behind the current `Error` state
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn sync_stats(&self) -> Option<SyncStats> {
        self.sync.as_ref().map(ProgressSynchronizer::stats)
    }

    fn duration(&self) -> f64 {
        self.item.as_ref().map(|item| item.duration).unwrap_or(0.0)
    }

    /// Opens `item_id`, tearing down whatever was open
    ///
    /// Must be called inside a tokio runtime; the result arrives as an event.
    pub fn open(&mut self, item_id: ItemId) {
        self.begin(item_id, None);
    }

    fn begin(&mut self, item_id: ItemId, resume_hint: Option<f64>) {
        // Fire-and-forget: the old synchronizer finishes its teardown push on its own
        let _ = self.teardown();

        self.generation += 1;
        let generation = self.generation;
        self.seek_seq = 0;
        self.state = SessionState::Initializing;
        self.last_error = None;
        self.item_id = Some(item_id.clone());
        self.resume_hint = resume_hint;
        log::info!("Opening {} (session {})", item_id, generation);

        let gateway = Arc::clone(&self.services.gateway);
        let acquirer = self.acquirer.clone();
        let events_tx = self.events_tx.clone();
        let rewind = self.settings.resume_rewind_secs;

        self.init_task = Some(tokio::spawn(async move {
            let result = initialize(gateway, acquirer, item_id, resume_hint, rewind).await;
            let event = SessionEvent::new(generation, SessionEventKind::Initialized(Box::new(result)));
            let _ = events_tx.send(event);
        }));
    }

    /// Applies one event from `SessionEvents`
    pub fn apply(&mut self, event: SessionEvent) {
        if event.generation() != self.generation {
            log::debug!(
                "Dropping event from session {} (live: {})",
                event.generation(),
                self.generation
            );
            if let SessionEventKind::Initialized(result) = event.kind {
                if let Ok(prepared) = *result {
                    prepared.handle.release();
                }
            }
            return;
        }

        match event.kind {
            SessionEventKind::Initialized(result) => self.on_initialized(*result),
            SessionEventKind::Transport(TransportEvent::Position { seconds, seek }) => {
                if self.confirms_latest_seek(seek) {
                    self.on_position(seconds);
                }
            }
            SessionEventKind::Transport(TransportEvent::Ended { seek }) => {
                if self.confirms_latest_seek(seek) {
                    self.on_ended();
                }
            }
            SessionEventKind::Transport(TransportEvent::Failed(err)) => self.on_stream_failed(err),
        }
    }

    fn on_initialized(&mut self, result: Result<Prepared, AppError>) {
        self.init_task = None;
        if self.state != SessionState::Initializing {
            if let Ok(prepared) = result {
                prepared.handle.release();
            }
            return;
        }

        let Prepared {
            item,
            progress,
            resume,
            handle,
        } = match result {
            Ok(prepared) => prepared,
            Err(err) => return self.fail(err),
        };

        let events = TransportEvents::new(self.generation, self.events_tx.clone());
        let mut transport = match self.services.transports.create(&handle, item.duration, events) {
            Ok(transport) => transport,
            Err(err) => {
                handle.release();
                return self.fail(err.into());
            }
        };
        let seek = self.seek_seq + 1;
        let positioned = transport
            .set_rate(self.rate)
            .and_then(|()| transport.seek(resume, seek));
        if let Err(err) = positioned {
            transport.release();
            handle.release();
            return self.fail(err.into());
        }

        self.seek_seq = seek;
        self.chapters = ChapterIndex::build(&item.chapters, item.duration);
        self.sleep = SleepTimer::new(self.settings.sleep_fire_epsilon_secs);
        self.current_chapter = self.chapters.index_at(resume);

        let (playhead, observed) = watch::channel(resume);
        self.playhead = playhead;
        self.position = resume;

        let poll: ProgressPoll = {
            let item_id = item.id.clone();
            let duration = item.duration;
            Arc::new(move || Some(ProgressRecord::new(item_id.clone(), *observed.borrow(), duration)))
        };
        self.sync = Some(ProgressSynchronizer::start(
            Arc::clone(&self.services.sink),
            self.settings.sync.clone(),
            item.id.clone(),
            poll,
        ));

        log::info!(
            "Ready: {} ({} chapters, {} stream) at {:.1}s{}",
            item.metadata.title,
            self.chapters.len(),
            handle.strategy,
            resume,
            if progress.is_some() { " from saved progress" } else { "" }
        );

        self.item = Some(item);
        self.handle = Some(handle);
        self.transport = Some(transport);
        self.state = SessionState::Ready;
        self.publish_now_playing();

        if self.settings.auto_play {
            if let Err(err) = self.play() {
                log::warn!("Auto-play failed: {}", err);
            }
        }
    }

    /// Reports produced before the latest seek describe the old playhead
    fn confirms_latest_seek(&self, seek: u64) -> bool {
        if seek < self.seek_seq {
            log::trace!("Dropping report from seek {} (latest {})", seek, self.seek_seq);
            return false;
        }
        true
    }

    fn on_position(&mut self, time: f64) {
        if !self.state.has_transport() || !time.is_finite() {
            return;
        }
        let previous = self.position;
        let time = time.clamp(0.0, self.duration());
        self.set_position(time);

        // Before the chapter update: crossing into the next chapter may be the target itself
        if self.state.is_playing() && self.sleep.check(time) {
            self.sleep_fired();
        }

        self.update_chapter(classify_change(previous, time));
    }

    fn on_ended(&mut self) {
        if !self.state.has_transport() {
            return;
        }
        let duration = self.duration();
        self.on_position(duration);

        if self.state != SessionState::Suspended {
            self.state = SessionState::Paused;
        }
        log::info!("Reached the end of {}", self.describe());

        if let (Some(sync), Some(item_id)) = (self.sync.as_mut(), self.item_id.clone()) {
            sync.suspend();
            sync.push_record(ProgressRecord::finished(item_id, duration), PushReason::Finished);
        }
        self.publish_now_playing();
    }

    fn on_stream_failed(&mut self, err: StreamError) {
        if !self.state.has_transport() {
            return;
        }
        self.resume_hint = Some(self.position);
        if let Some(sync) = self.sync.as_mut() {
            sync.suspend();
            sync.flush(PushReason::Pause);
        }
        self.fail(err.into());
    }

    fn fail(&mut self, err: AppError) {
        log::warn!("Session for {} failed: {}", self.describe(), err);
        self.release_media();
        self.state = SessionState::Error(err.user_message());
        self.last_error = Some(err);
        self.services.now_playing.clear();
    }

    fn sleep_fired(&mut self) {
        log::info!("Sleep timer reached at {:.1}s", self.position);
        if let Some(transport) = self.transport.as_mut() {
            if let Err(err) = transport.pause() {
                log::warn!("Failed to pause for sleep timer: {}", err);
            }
        }
        self.enter_paused(SessionState::Suspended);
    }

    fn enter_paused(&mut self, state: SessionState) {
        self.state = state;
        if let Some(sync) = self.sync.as_mut() {
            sync.suspend();
            sync.flush(PushReason::Pause);
        }
        self.publish_now_playing();
    }

    fn set_position(&mut self, time: f64) {
        self.position = time;
        self.playhead.send_replace(time);
    }

    fn update_chapter(&mut self, change: ChapterChange) {
        let chapter = self.chapters.index_at(self.position);
        if chapter == self.current_chapter {
            return;
        }
        let from = std::mem::replace(&mut self.current_chapter, chapter);
        let target = self
            .sleep
            .on_chapter_change(from, chapter, change, &self.chapters);
        log::debug!(
            "Chapter {:?} -> {:?} ({:?}), sleep target {:?}",
            from,
            chapter,
            change,
            target
        );
        self.publish_now_playing();
    }

    fn transport_mut(&mut self) -> EngineResult<&mut Box<dyn Transport>> {
        let state = &self.state;
        self.transport
            .as_mut()
            .ok_or_else(|| EngineError::InvalidState(format!("no stream while {}", state)))
    }

    /// Starts or resumes playback; at the end of the book, starts over
    pub fn play(&mut self) -> EngineResult<()> {
        if self.state.is_playing() {
            return Ok(());
        }
        if !self.state.can_play() {
            return Err(invalid_state("play", &self.state));
        }
        let duration = self.duration();
        if duration > 0.0 && self.position >= duration {
            self.seek(0.0)?;
        }

        self.transport_mut()?.play()?;
        self.state = SessionState::Playing;
        if let Some(sync) = self.sync.as_mut() {
            sync.resume();
        }
        log::debug!("Playing {} from {:.1}s", self.describe(), self.position);
        self.publish_now_playing();
        Ok(())
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        match self.state {
            SessionState::Playing => {}
            SessionState::Ready | SessionState::Paused | SessionState::Suspended => return Ok(()),
            _ => return Err(invalid_state("pause", &self.state)),
        }
        self.transport_mut()?.pause()?;
        self.enter_paused(SessionState::Paused);
        Ok(())
    }

    pub fn toggle(&mut self) -> EngineResult<()> {
        if self.state.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Moves to `seconds`, clamped to the item
    pub fn seek(&mut self, seconds: f64) -> EngineResult<()> {
        if !seconds.is_finite() {
            return Err(EngineError::InvalidArgument {
                argument: "seconds".to_string(),
                reason: format!("{} is not a position", seconds),
            });
        }
        let time = seconds.clamp(0.0, self.duration());
        let seek = self.seek_seq + 1;
        self.transport_mut()?.seek(time, seek)?;
        self.seek_seq = seek;
        self.set_position(time);
        self.update_chapter(ChapterChange::Jump);
        self.publish_now_playing();
        Ok(())
    }

    /// Relative seek
    pub fn jump(&mut self, delta: f64) -> EngineResult<()> {
        self.seek(self.position + delta)
    }

    pub fn jump_forward(&mut self) -> EngineResult<()> {
        self.jump(self.settings.jump_forward_secs)
    }

    pub fn jump_backward(&mut self) -> EngineResult<()> {
        self.jump(-self.settings.jump_backward_secs)
    }

    /// Moves `delta` chapters from the current one, to that chapter's start
    ///
    /// Clamped to the first and last chapter; a no-op without chapters.
    pub fn skip(&mut self, delta: isize) -> EngineResult<()> {
        if !self.state.has_transport() {
            return Err(invalid_state("skip", &self.state));
        }
        let Some((low, high)) = self.chapters.skip_bounds() else {
            return Ok(());
        };

        let last = self.chapters.len() as isize - 1;
        let target = match self.current_chapter {
            Some(current) => current as isize + delta,
            None if self.position < low => delta - 1,
            None => last,
        }
        .clamp(0, last) as usize;

        let start = self
            .chapters
            .get(target)
            .map(|chapter| chapter.start)
            .unwrap_or(low)
            .clamp(low, high);
        self.seek(start)
    }

    /// Stop after `chapters` chapters (0 disables); returns the new target
    pub fn set_sleep_chapters(&mut self, chapters: u8) -> EngineResult<Option<f64>> {
        let target = self
            .sleep
            .set_chapters(chapters, self.current_chapter, &self.chapters)?;
        match target {
            Some(target) => log::info!(
                "Sleep after {} chapter(s), at {:.1}s",
                chapters,
                target
            ),
            None => log::info!("Sleep timer off"),
        }
        Ok(target)
    }

    pub fn set_rate(&mut self, rate: f32) -> EngineResult<()> {
        let rate = PlaybackRate::new(rate).map_err(|reason| EngineError::InvalidArgument {
            argument: "rate".to_string(),
            reason,
        })?;
        if let Some(transport) = self.transport.as_mut() {
            transport.set_rate(rate)?;
        }
        self.rate = rate;
        self.publish_now_playing();
        Ok(())
    }

    /// Dispatches a platform remote-control command
    pub fn handle_remote_action(&mut self, action: RemoteAction) -> EngineResult<()> {
        log::debug!("Remote action {:?}", action);
        match action {
            RemoteAction::Play => self.play(),
            RemoteAction::Pause => self.pause(),
            RemoteAction::SeekTo(seconds) => self.seek(seconds),
            RemoteAction::SeekBy(delta) => self.jump(delta),
            RemoteAction::PreviousChapter => self.skip(-1),
            RemoteAction::NextChapter => self.skip(1),
        }
    }

    /// Re-opens the item after a failure, from the last observed position
    pub fn retry(&mut self) -> EngineResult<()> {
        if !self.state.is_error() {
            return Err(invalid_state("retry", &self.state));
        }
        let item_id = self
            .item_id
            .clone()
            .ok_or_else(|| EngineError::InvalidState("nothing to retry".to_string()))?;
        let hint = self.resume_hint;
        self.begin(item_id, hint);
        Ok(())
    }

    /// Final flush and release of every resource
    ///
    /// Returns the drain of the teardown push, for callers that want to wait
    /// for it before exiting.
    pub fn close(&mut self) -> Option<SyncDrain> {
        let drain = self.teardown();
        self.generation += 1;
        if self.state != SessionState::Idle {
            log::info!("Closed {}", self.describe());
        }
        self.state = SessionState::Closed;
        self.item_id = None;
        self.resume_hint = None;
        drain
    }

    fn teardown(&mut self) -> Option<SyncDrain> {
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
        // A failed session already sent its pause push
        let failed = self.state.is_error();
        let drain = self.sync.take().map(|mut sync| {
            if failed {
                sync.retire();
                sync.drain()
            } else {
                sync.stop()
            }
        });
        self.release_media();
        if self.item.take().is_some() {
            self.services.now_playing.clear();
        }
        self.chapters = ChapterIndex::build(&[], 0.0);
        self.current_chapter = None;
        self.sleep.cancel();
        drain
    }

    fn release_media(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.release();
        }
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let duration = self.duration();
        let chapter = self.chapters.locate(self.position);
        SessionSnapshot {
            state: self.state.clone(),
            item_id: self.item_id.clone(),
            metadata: self.item.as_ref().map(|item| item.metadata.clone()),
            position: self.position,
            duration,
            chapter_title: chapter
                .and_then(|c| self.chapters.get(c.index))
                .map(|c| c.title.clone()),
            chapter,
            chapter_progress: self.chapters.chapter_progress(self.position),
            sleep: self.sleep.state(),
            rate: self.rate,
            strategy: self.handle.as_ref().map(|handle| handle.strategy),
            is_finished: ProgressRecord::is_finished_at(self.position, duration),
            sync: self.sync_stats(),
        }
    }

    fn publish_now_playing(&self) {
        let Some(item) = &self.item else { return };
        let info = NowPlayingInfo {
            title: item.metadata.title.clone(),
            author: item.metadata.author.clone(),
            narrator: item.metadata.narrator.clone(),
            series: item.metadata.series.clone(),
            artwork: item.metadata.cover_path.clone(),
            chapter_title: self
                .current_chapter
                .and_then(|index| self.chapters.get(index))
                .map(|chapter| chapter.title.clone()),
            duration: item.duration,
            position: self.position,
            rate: self.rate.value(),
            is_playing: self.state.is_playing(),
        };
        self.services.now_playing.publish(&info);
    }

    fn describe(&self) -> String {
        match (&self.item, &self.item_id) {
            (Some(item), _) => format!("'{}'", item.metadata.title),
            (None, Some(id)) => id.to_string(),
            (None, None) => "session".to_string(),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
    }
}

async fn initialize(
    gateway: Arc<dyn MediaGateway>,
    acquirer: StreamAcquirer,
    item_id: ItemId,
    resume_hint: Option<f64>,
    rewind: f64,
) -> Result<Prepared, AppError> {
    let (item, progress) = tokio::join!(
        gateway.fetch_item(&item_id),
        gateway.fetch_progress(&item_id)
    );

    let item = item.map_err(|err| AppError::InitializationFailure {
        item_id: item_id.to_string(),
        reason: err.to_string(),
    })?;
    let progress = progress.unwrap_or_else(|err| {
        log::warn!("No resume point for {}: {}", item_id, err);
        None
    });

    let resume = resume_position(resume_hint, progress.as_ref(), rewind).clamp(0.0, item.duration.max(0.0));
    let handle = acquirer.acquire(&item, resume).await?;

    Ok(Prepared {
        item,
        progress,
        resume,
        handle,
    })
}

/// Where to start: a retry hint wins, then saved progress less the rewind
fn resume_position(hint: Option<f64>, progress: Option<&ProgressRecord>, rewind: f64) -> f64 {
    match (hint, progress) {
        (Some(hint), _) => hint,
        (None, Some(record)) if record.is_finished => 0.0,
        (None, Some(record)) => (record.resume_position() - rewind).max(0.0),
        (None, None) => 0.0,
    }
}

/// Small forward steps are listening; anything else is a jump
fn classify_change(previous: f64, next: f64) -> ChapterChange {
    if next >= previous && next - previous <= NATURAL_STEP_SECS {
        ChapterChange::Natural
    } else {
        ChapterChange::Jump
    }
}

fn invalid_state(operation: &str, state: &SessionState) -> EngineError {
    EngineError::InvalidState(format!("cannot {} while {}", operation, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_position_rules() {
        let id = ItemId::new("li_1");
        let saved = ProgressRecord::new(id.clone(), 600.0, 3600.0);
        let finished = ProgressRecord::new(id, 3595.0, 3600.0);

        assert_eq!(resume_position(None, None, 5.0), 0.0);
        assert_eq!(resume_position(None, Some(&saved), 5.0), 595.0);
        assert_eq!(resume_position(None, Some(&finished), 5.0), 0.0);
        assert_eq!(resume_position(Some(42.0), Some(&saved), 5.0), 42.0);
    }

    #[test]
    fn test_rewind_never_goes_negative() {
        let saved = ProgressRecord::new(ItemId::new("li_1"), 3.0, 3600.0);
        assert_eq!(resume_position(None, Some(&saved), 10.0), 0.0);
    }

    #[test]
    fn test_classify_change() {
        assert_eq!(classify_change(299.75, 300.0), ChapterChange::Natural);
        assert_eq!(classify_change(100.0, 700.0), ChapterChange::Jump);
        assert_eq!(classify_change(700.0, 699.0), ChapterChange::Jump);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.player.sync_interval_secs = 30;
        config.player.default_rate = 9.0;
        config.streaming.software_demuxer = false;

        let settings = SessionSettings::from_config(&config);
        assert_eq!(settings.sync.interval, std::time::Duration::from_secs(30));
        assert_eq!(settings.default_rate, PlaybackRate::default());
        assert!(!settings.capabilities.supports_adaptive());
    }
}

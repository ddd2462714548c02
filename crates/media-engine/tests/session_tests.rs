// crates/media-engine/tests/session_tests.rs
//! End-to-end session tests over in-memory collaborators and simulated time

use async_trait::async_trait;
use media_engine::{
    HeadlessTransportFactory, NowPlayingInfo, NowPlayingPublisher, RemoteAction,
    SessionController, SessionEvents, SessionServices, SessionSettings, SessionState,
    StreamStrategy,
};
use shelfplay_core::{
    AppError, AudioRendition, Chapter, ItemId, ItemMetadata, LibraryItem, ProgressRecord,
    RecoveryAction,
};
use shelfplay_network::{
    Bytes, Credential, GatewayError, GatewayResult, MediaFetcher, MediaGateway, Url,
};
use shelfplay_resilience::RetryPolicy;
use shelfplay_sync_engine::{GatewaySink, SyncConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct FakeGateway {
    items: Mutex<HashMap<ItemId, LibraryItem>>,
    progress: Mutex<HashMap<ItemId, ProgressRecord>>,
    item_delays: Mutex<HashMap<ItemId, Duration>>,
    progress_fails: AtomicBool,
    push_delay: Mutex<Duration>,
    pushes: Mutex<Vec<ProgressRecord>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGateway {
    fn with_item(self, item: LibraryItem) -> Self {
        self.items.lock().unwrap().insert(item.id.clone(), item);
        self
    }

    fn with_progress(self, record: ProgressRecord) -> Self {
        self.progress
            .lock()
            .unwrap()
            .insert(record.item_id.clone(), record);
        self
    }

    fn pushes(&self) -> Vec<ProgressRecord> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    async fn fetch_item(&self, id: &ItemId) -> GatewayResult<LibraryItem> {
        let delay = self.item_delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.items
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("/api/items/{}", id)))
    }

    async fn fetch_progress(&self, id: &ItemId) -> GatewayResult<Option<ProgressRecord>> {
        if self.progress_fails.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                url: format!("/api/me/progress/{}", id),
            });
        }
        Ok(self.progress.lock().unwrap().get(id).cloned())
    }

    async fn push_progress(&self, record: &ProgressRecord) -> GatewayResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.push_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.pushes.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Serves a ten-segment playlist; segments from `fail_from` on answer 503
struct FakeFetcher {
    base: Url,
    fail_from: AtomicUsize,
    reach_checks: AtomicUsize,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            base: Url::parse("http://abs.local/").unwrap(),
            fail_from: AtomicUsize::new(usize::MAX),
            reach_checks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    fn base_url(&self) -> &Url {
        &self.base
    }

    fn credential(&self) -> Option<&Credential> {
        None
    }

    async fn get_text(&self, url: &Url) -> GatewayResult<String> {
        if !url.path().ends_with(".m3u8") {
            return Err(GatewayError::NotFound(url.to_string()));
        }
        let mut playlist = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:10\n");
        for i in 0..10 {
            playlist.push_str(&format!("#EXTINF:10.0,\nseg-{}.ts\n", i));
        }
        playlist.push_str("#EXT-X-ENDLIST\n");
        Ok(playlist)
    }

    async fn get_bytes(&self, url: &Url) -> GatewayResult<Bytes> {
        let index: usize = url
            .path()
            .rsplit('-')
            .next()
            .and_then(|s| s.trim_end_matches(".ts").parse().ok())
            .unwrap_or(0);
        if index >= self.fail_from.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 503,
                url: url.to_string(),
            });
        }
        Ok(Bytes::from_static(b"segment"))
    }

    async fn check_reachable(&self, _url: &Url) -> GatewayResult<()> {
        self.reach_checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<NowPlayingInfo>>,
    clears: AtomicUsize,
}

impl NowPlayingPublisher for RecordingPublisher {
    fn publish(&self, info: &NowPlayingInfo) {
        self.published.lock().unwrap().push(info.clone());
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

fn book(id: &str, title: &str, duration: f64, chapters: &[(f64, f64)]) -> LibraryItem {
    let chapters = chapters
        .iter()
        .enumerate()
        .map(|(i, (start, end))| Chapter::new(i, format!("Chapter {}", i + 1), *start, *end))
        .collect();
    LibraryItem::new(ItemId::new(id), duration, ItemMetadata::titled(title))
        .with_chapters(chapters)
        .with_rendition(AudioRendition::direct(
            format!("/api/items/{}/file/1", id),
            Some("audio/mpeg".to_string()),
        ))
}

const THREE_CHAPTERS: &[(f64, f64)] = &[(0.0, 300.0), (300.0, 700.0), (700.0, 1000.0)];

struct Harness {
    gateway: Arc<FakeGateway>,
    fetcher: Arc<FakeFetcher>,
    publisher: Arc<RecordingPublisher>,
    controller: SessionController,
    events: SessionEvents,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn harness(gateway: FakeGateway, settings: SessionSettings) -> Harness {
    init_logging();
    let gateway = Arc::new(gateway);
    let fetcher = Arc::new(FakeFetcher::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let services = SessionServices {
        gateway: Arc::clone(&gateway) as Arc<dyn MediaGateway>,
        fetcher: Arc::clone(&fetcher) as Arc<dyn MediaFetcher>,
        sink: Arc::new(GatewaySink::new(Arc::clone(&gateway) as Arc<dyn MediaGateway>)),
        transports: Arc::new(HeadlessTransportFactory::new(Duration::from_millis(250))),
        now_playing: Arc::clone(&publisher) as Arc<dyn NowPlayingPublisher>,
    };
    let (controller, events) = SessionController::new(services, settings);
    Harness {
        gateway,
        fetcher,
        publisher,
        controller,
        events,
    }
}

fn paused_settings() -> SessionSettings {
    SessionSettings {
        auto_play: false,
        ..SessionSettings::default()
    }
}

impl Harness {
    /// Applies events as they arrive for `span` of simulated time
    async fn run_for(&mut self, span: Duration) {
        let deadline = Instant::now() + span;
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.controller.apply(event),
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
    }

    async fn open(&mut self, id: &str) {
        self.controller.open(ItemId::new(id));
        self.run_for(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_fresh_item_syncs_every_interval_and_on_close() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 3600.0, &[]));
    let mut h = harness(gateway, SessionSettings::default());

    h.controller.open(ItemId::new("li_1"));
    h.run_for(Duration::from_millis(15_100)).await;

    assert_eq!(h.controller.state(), &SessionState::Playing);
    let pushes = h.gateway.pushes();
    assert_eq!(pushes.len(), 1, "pushes: {:?}", pushes);
    assert!((pushes[0].current_time - 15.0).abs() <= 0.5);

    let drain = h.controller.close().expect("sync was running");
    assert!(drain.settled_within(Duration::from_secs(3)).await);

    let pushes = h.gateway.pushes();
    assert_eq!(pushes.len(), 2);
    let last = &pushes[1];
    assert!((last.current_time - 15.0).abs() <= 0.5);
    assert!(!last.is_finished);
    assert_eq!(h.controller.state(), &SessionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_resumes_from_saved_progress() {
    let gateway = FakeGateway::default()
        .with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS))
        .with_progress(ProgressRecord::new(ItemId::new("li_1"), 450.0, 1000.0));
    let settings = SessionSettings {
        resume_rewind_secs: 5.0,
        ..paused_settings()
    };
    let mut h = harness(gateway, settings);

    h.open("li_1").await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.state, SessionState::Ready);
    assert_eq!(snapshot.position, 445.0);
    assert_eq!(snapshot.chapter.map(|c| c.index), Some(1));
    assert_eq!(snapshot.chapter_progress, "2/3");
    assert_eq!(snapshot.strategy, Some(StreamStrategy::Direct));
    assert_eq!(h.fetcher.reach_checks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_progress_fetch_failure_is_not_fatal() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS));
    gateway.progress_fails.store(true, Ordering::SeqCst);
    let mut h = harness(gateway, paused_settings());

    h.open("li_1").await;

    assert_eq!(h.controller.state(), &SessionState::Ready);
    assert_eq!(h.controller.position(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_item_is_an_initialization_failure() {
    let mut h = harness(FakeGateway::default(), paused_settings());

    h.open("li_missing").await;

    assert!(h.controller.state().is_error());
    assert!(matches!(
        h.controller.last_error(),
        Some(AppError::InitializationFailure { .. })
    ));

    h.controller.retry().unwrap();
    assert_eq!(h.controller.state(), &SessionState::Initializing);
    h.run_for(Duration::from_millis(10)).await;
    assert!(h.controller.state().is_error());
}

#[tokio::test(start_paused = true)]
async fn test_sleep_in_last_chapter_fires_at_duration() {
    let gateway = FakeGateway::default()
        .with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS))
        .with_progress(ProgressRecord::new(ItemId::new("li_1"), 950.0, 1000.0));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    let target = h.controller.set_sleep_chapters(1).unwrap();
    assert_eq!(target, Some(1000.0));

    h.controller.play().unwrap();
    h.run_for(Duration::from_secs(60)).await;

    assert_eq!(h.controller.state(), &SessionState::Suspended);
    let sleep = h.controller.sleep_state();
    assert_eq!(sleep.chapters_remaining, 0);
    assert_eq!(sleep.target_time, None);
    assert!(h.controller.position() >= 999.5);

    // Late ticks never fire it again
    h.run_for(Duration::from_secs(5)).await;
    assert_eq!(h.controller.state(), &SessionState::Suspended);
}

#[tokio::test(start_paused = true)]
async fn test_sleep_target_survives_natural_crossing() {
    let gateway = FakeGateway::default()
        .with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS))
        .with_progress(ProgressRecord::new(ItemId::new("li_1"), 290.0, 1000.0));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    assert_eq!(h.controller.set_sleep_chapters(2).unwrap(), Some(700.0));
    h.controller.play().unwrap();
    h.run_for(Duration::from_secs(20)).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.chapter.map(|c| c.index), Some(1));
    assert_eq!(snapshot.sleep.target_time, Some(700.0));
    assert_eq!(snapshot.sleep.chapters_remaining, 1);
    assert_eq!(snapshot.state, SessionState::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_sleep_target_follows_seeks() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    assert_eq!(h.controller.set_sleep_chapters(1).unwrap(), Some(300.0));
    h.controller.seek(500.0).unwrap();
    assert_eq!(h.controller.sleep_state().target_time, Some(700.0));
    assert_eq!(h.controller.sleep_state().chapters_remaining, 1);

    h.controller.set_sleep_chapters(0).unwrap();
    assert_eq!(h.controller.sleep_state().target_time, None);
}

/// Opens at 660 s (chapter 2), arms one chapter and lets reports queue unapplied
async fn playing_with_queued_reports() -> Harness {
    let gateway = FakeGateway::default()
        .with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS))
        .with_progress(ProgressRecord::new(ItemId::new("li_1"), 660.0, 1000.0));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    assert_eq!(h.controller.set_sleep_chapters(1).unwrap(), Some(700.0));
    h.controller.play().unwrap();
    h.run_for(Duration::from_secs(1)).await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    h
}

#[tokio::test(start_paused = true)]
async fn test_reports_queued_before_a_skip_are_ignored() {
    let mut h = playing_with_queued_reports().await;

    h.controller.skip(-1).unwrap();
    assert_eq!(h.controller.position(), 0.0);
    assert_eq!(h.controller.sleep_state().target_time, Some(300.0));

    h.run_for(Duration::from_millis(600)).await;

    assert_eq!(h.controller.state(), &SessionState::Playing);
    let sleep = h.controller.sleep_state();
    assert_eq!(sleep.target_time, Some(300.0));
    assert_eq!(sleep.chapters_remaining, 1);
    assert!(h.controller.position() < 1.0, "position {}", h.controller.position());
}

#[tokio::test(start_paused = true)]
async fn test_reports_queued_before_a_seek_are_ignored() {
    let mut h = playing_with_queued_reports().await;

    h.controller.seek(100.0).unwrap();
    assert_eq!(h.controller.sleep_state().target_time, Some(300.0));

    h.run_for(Duration::from_millis(600)).await;

    assert_eq!(h.controller.state(), &SessionState::Playing);
    assert_eq!(h.controller.sleep_state().target_time, Some(300.0));
    let position = h.controller.position();
    assert!((100.0..101.0).contains(&position), "position {}", position);
    assert_eq!(h.controller.snapshot().chapter.map(|c| c.index), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_late_events_from_closed_session_are_ignored() {
    let gateway = FakeGateway::default()
        .with_item(book("li_a", "A", 1000.0, THREE_CHAPTERS))
        .with_item(book("li_b", "B", 2000.0, &[]));
    gateway
        .item_delays
        .lock()
        .unwrap()
        .insert(ItemId::new("li_a"), Duration::from_secs(2));
    let mut h = harness(gateway, SessionSettings::default());

    h.controller.open(ItemId::new("li_a"));
    h.controller.close();
    h.controller.open(ItemId::new("li_b"));
    h.run_for(Duration::from_secs(5)).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.item_id, Some(ItemId::new("li_b")));
    assert_eq!(snapshot.duration, 2000.0);
    assert_eq!(snapshot.metadata.map(|m| m.title), Some("B".to_string()));
    assert!(h.gateway.pushes().iter().all(|p| p.item_id.as_str() == "li_b"));
}

#[tokio::test(start_paused = true)]
async fn test_queued_ticks_do_not_leak_into_next_item() {
    let gateway = FakeGateway::default()
        .with_item(book("li_a", "A", 1000.0, THREE_CHAPTERS))
        .with_item(book("li_b", "B", 2000.0, &[]))
        .with_progress(ProgressRecord::new(ItemId::new("li_a"), 600.0, 1000.0));
    let mut h = harness(gateway, SessionSettings::default());

    h.open("li_a").await;
    h.run_for(Duration::from_secs(3)).await;
    let generation = h.controller.generation();

    // Let A's transport queue a few reports without applying them
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.controller.open(ItemId::new("li_b"));
    assert!(h.controller.generation() > generation);
    h.run_for(Duration::from_secs(1)).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.item_id, Some(ItemId::new("li_b")));
    assert!(snapshot.position < 2.0, "position {}", snapshot.position);

    let pushes = h.gateway.pushes();
    let teardown = pushes
        .iter()
        .find(|p| p.item_id.as_str() == "li_a")
        .expect("A was flushed on teardown");
    assert!(teardown.current_time >= 600.0 && teardown.current_time < 610.0);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_pushes_stay_one_in_flight() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 3600.0, &[]));
    *gateway.push_delay.lock().unwrap() = Duration::from_secs(12);
    let settings = SessionSettings {
        sync: SyncConfig::with_interval_secs(5),
        ..SessionSettings::default()
    };
    let mut h = harness(gateway, settings);

    h.open("li_1").await;
    h.run_for(Duration::from_secs(31)).await;
    h.controller.pause().unwrap();
    h.run_for(Duration::from_secs(40)).await;

    assert_eq!(h.gateway.max_in_flight.load(Ordering::SeqCst), 1);
    let stats = h.controller.sync_stats().unwrap();
    assert!(stats.pushes_coalesced >= 1, "{:?}", stats);

    // The pause push was parked, not dropped, and went out last
    let pushes = h.gateway.pushes();
    let last = pushes.last().unwrap();
    assert!((last.current_time - 31.0).abs() <= 0.5, "{:?}", pushes);
}

#[tokio::test(start_paused = true)]
async fn test_natural_end_pushes_finished_record() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Short", 20.0, &[]));
    let mut h = harness(gateway, SessionSettings::default());

    h.open("li_1").await;
    h.run_for(Duration::from_secs(25)).await;

    assert_eq!(h.controller.state(), &SessionState::Paused);
    assert_eq!(h.controller.position(), 20.0);
    let last = h.gateway.pushes().last().cloned().unwrap();
    assert!(last.is_finished);
    assert_eq!(last.current_time, 20.0);
    assert!(h.controller.snapshot().is_finished);

    // Playing again starts over
    h.controller.play().unwrap();
    assert_eq!(h.controller.position(), 0.0);
    assert_eq!(h.controller.state(), &SessionState::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_chapter_skips_clamp_and_keep_play_state() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    h.controller.seek(120.0).unwrap();
    h.controller.skip(1).unwrap();
    assert_eq!(h.controller.position(), 300.0);

    h.controller.skip(5).unwrap();
    assert_eq!(h.controller.position(), 700.0);

    h.controller.skip(-1).unwrap();
    assert_eq!(h.controller.position(), 300.0);

    h.controller.skip(-5).unwrap();
    assert_eq!(h.controller.position(), 0.0);
    assert_eq!(h.controller.state(), &SessionState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_skip_without_chapters_is_a_no_op() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, &[]));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    h.controller.seek(42.0).unwrap();
    h.controller.skip(1).unwrap();
    assert_eq!(h.controller.position(), 42.0);
    assert_eq!(h.controller.set_sleep_chapters(3).unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_remote_actions() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, THREE_CHAPTERS));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    h.controller
        .handle_remote_action(RemoteAction::SeekTo(100.0))
        .unwrap();
    h.controller
        .handle_remote_action(RemoteAction::SeekBy(-30.0))
        .unwrap();
    assert_eq!(h.controller.position(), 70.0);

    h.controller
        .handle_remote_action(RemoteAction::NextChapter)
        .unwrap();
    assert_eq!(h.controller.position(), 300.0);

    h.controller.handle_remote_action(RemoteAction::Play).unwrap();
    assert!(h.controller.state().is_playing());
    h.controller.handle_remote_action(RemoteAction::Pause).unwrap();
    assert_eq!(h.controller.state(), &SessionState::Paused);

    let published = h.publisher.published.lock().unwrap();
    let last = published.last().unwrap();
    assert_eq!(last.title, "Dune");
    assert_eq!(last.chapter_title.as_deref(), Some("Chapter 2"));
    assert!(!last.is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_rate_is_validated() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, &[]));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    assert!(h.controller.set_rate(5.0).is_err());
    h.controller.set_rate(2.0).unwrap();
    assert_eq!(h.controller.snapshot().rate.value(), 2.0);

    h.controller.play().unwrap();
    h.run_for(Duration::from_secs(10)).await;
    assert!((h.controller.position() - 20.0).abs() <= 0.5);
}

#[tokio::test(start_paused = true)]
async fn test_adaptive_fault_mid_stream_moves_to_error_and_retries_from_position() {
    let item = LibraryItem::new(ItemId::new("li_1"), 100.0, ItemMetadata::titled("Dune"))
        .with_rendition(AudioRendition::adaptive("/hls/li_1/output.m3u8"));
    let gateway = FakeGateway::default().with_item(item);
    let mut settings = SessionSettings::default();
    settings.stream.retry_policy = RetryPolicy::new(2).with_initial_delay(Duration::from_millis(10));
    let mut h = harness(gateway, settings);
    h.fetcher.fail_from.store(5, Ordering::SeqCst);

    h.open("li_1").await;
    assert_eq!(
        h.controller.snapshot().strategy,
        Some(StreamStrategy::Adaptive)
    );
    h.run_for(Duration::from_secs(30)).await;

    assert!(h.controller.state().is_error());
    let error = h.controller.last_error().unwrap();
    assert_eq!(error.recovery_action(), RecoveryAction::ReopenSession);
    let failed_at = h.controller.position();
    assert!(failed_at > 0.0);

    let pushes = h.gateway.pushes();
    assert!((pushes.last().unwrap().current_time - failed_at).abs() <= 0.5);

    h.fetcher.fail_from.store(usize::MAX, Ordering::SeqCst);
    h.controller.retry().unwrap();
    h.run_for(Duration::from_millis(10)).await;
    assert!(h.controller.state().is_playing());
    assert!(h.controller.position() >= failed_at);

    // The failed attempt was already flushed on failure; re-opening adds no write
    assert_eq!(h.gateway.pushes().len(), pushes.len());
}

#[tokio::test(start_paused = true)]
async fn test_close_clears_now_playing() {
    let gateway = FakeGateway::default().with_item(book("li_1", "Dune", 1000.0, &[]));
    let mut h = harness(gateway, paused_settings());
    h.open("li_1").await;

    assert!(h.controller.close().is_some());
    assert_eq!(h.publisher.clears.load(Ordering::SeqCst), 1);
    assert!(h.controller.play().is_err());
}

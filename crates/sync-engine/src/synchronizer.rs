// crates/sync-engine/src/synchronizer.rs
//! Periodic and transition progress pushes for one session
//!
//! Exactly one request is outstanding at a time. A periodic push that finds
//! one in flight is dropped; a transition push (pause, finished, teardown) is
//! parked in a single trailing slot and sent as soon as the outstanding request
//! settles, the latest transition replacing any earlier one still waiting.
//! Pushes therefore reach the sink in the order they were requested.

use crate::sink::ProgressSink;
use crate::types::{PushReason, SyncConfig, SyncStats};
use shelfplay_core::{AppError, ItemId, ProgressRecord};
use shelfplay_resilience::with_timeout;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Reads the current progress of the session, if it has any yet
pub type ProgressPoll = Arc<dyn Fn() -> Option<ProgressRecord> + Send + Sync>;

struct Shared {
    sink: Arc<dyn ProgressSink>,
    item_id: ItemId,
    alive: AtomicBool,
    in_flight: AtomicBool,
    trailing: Mutex<Option<(ProgressRecord, PushReason)>>,
    settled: Notify,
    attempted: AtomicU64,
    failed: AtomicU64,
    coalesced: AtomicU64,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Option<(ProgressRecord, PushReason)>> {
        self.trailing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Submits `record`, honouring the one-in-flight rule
fn submit(shared: &Arc<Shared>, record: ProgressRecord, reason: PushReason) {
    let mut slot = shared.slot();
    if shared.in_flight.load(Ordering::Acquire) {
        if reason.is_transition() {
            log::debug!(
                "Parking {} push at {:.1}s for {}",
                reason,
                record.current_time,
                shared.item_id
            );
            *slot = Some((record, reason));
        } else {
            shared.coalesced.fetch_add(1, Ordering::Relaxed);
            log::debug!("Dropping periodic push for {}: request in flight", shared.item_id);
        }
        return;
    }

    shared.in_flight.store(true, Ordering::Release);
    drop(slot);
    tokio::spawn(drive(Arc::clone(shared), record, reason));
}

/// Sends `record`, then whatever got parked meanwhile, until the slot is empty
async fn drive(shared: Arc<Shared>, mut record: ProgressRecord, mut reason: PushReason) {
    loop {
        shared.attempted.fetch_add(1, Ordering::Relaxed);
        let result = shared.sink.push(&record).await;

        if shared.is_alive() || reason == PushReason::Teardown {
            match result {
                Ok(()) => log::debug!(
                    "Pushed {} progress {:.1}s for {}",
                    reason,
                    record.current_time,
                    shared.item_id
                ),
                Err(e) => {
                    shared.failed.fetch_add(1, Ordering::Relaxed);
                    let err = AppError::from(e);
                    log::warn!("{} ({} push for {})", err, reason, shared.item_id);
                }
            }
        } else {
            log::debug!(
                "Discarding {} push result for retired session {}",
                reason,
                shared.item_id
            );
        }

        let mut slot = shared.slot();
        match slot.take() {
            Some((next, next_reason)) => {
                record = next;
                reason = next_reason;
            }
            None => {
                shared.in_flight.store(false, Ordering::Release);
                drop(slot);
                shared.settled.notify_waiters();
                return;
            }
        }
    }
}

/// Awaits the end of outstanding pushes after `stop`
#[derive(Clone)]
pub struct SyncDrain {
    shared: Arc<Shared>,
}

impl SyncDrain {
    /// Resolves once nothing is in flight or parked
    pub async fn settled(&self) {
        loop {
            let notified = self.shared.settled.notified();
            if !self.shared.in_flight.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }

    /// Like `settled`, bounded by `limit`; returns false on timeout
    pub async fn settled_within(&self, limit: Duration) -> bool {
        with_timeout(limit, self.settled()).await.is_ok()
    }
}

/// Progress synchronizer bound to a single session
pub struct ProgressSynchronizer {
    shared: Arc<Shared>,
    poll: ProgressPoll,
    config: SyncConfig,
    periodic: Option<JoinHandle<()>>,
}

impl ProgressSynchronizer {
    /// Binds a synchronizer to `item_id`; the periodic timer starts with `resume`
    pub fn start(
        sink: Arc<dyn ProgressSink>,
        config: SyncConfig,
        item_id: ItemId,
        poll: ProgressPoll,
    ) -> Self {
        log::debug!(
            "Progress sync for {} every {:?}",
            item_id,
            config.interval
        );
        Self {
            shared: Arc::new(Shared {
                sink,
                item_id,
                alive: AtomicBool::new(true),
                in_flight: AtomicBool::new(false),
                trailing: Mutex::new(None),
                settled: Notify::new(),
                attempted: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
            poll,
            config,
            periodic: None,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.shared.item_id
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    /// Whether the periodic timer is running
    pub fn is_periodic_running(&self) -> bool {
        self.periodic.is_some()
    }

    /// Starts the periodic timer; the first push happens one interval from now
    pub fn resume(&mut self) {
        if !self.is_alive() || self.periodic.is_some() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let poll = Arc::clone(&self.poll);
        let period = self.config.interval;

        self.periodic = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !shared.is_alive() {
                    break;
                }
                if let Some(record) = poll() {
                    submit(&shared, record, PushReason::Periodic);
                }
            }
        }));
    }

    /// Stops the periodic timer
    pub fn suspend(&mut self) {
        if let Some(task) = self.periodic.take() {
            task.abort();
        }
    }

    /// A periodic push right now; dropped if one is in flight
    pub fn tick(&self) {
        self.request(PushReason::Periodic);
    }

    /// A transition push of the current position
    pub fn flush(&self, reason: PushReason) {
        self.request(reason);
    }

    /// Pushes an explicit record, such as the terminal "finished" one
    pub fn push_record(&self, record: ProgressRecord, reason: PushReason) {
        if self.is_alive() {
            submit(&self.shared, record, reason);
        }
    }

    fn request(&self, reason: PushReason) {
        if !self.is_alive() {
            return;
        }
        match (self.poll)() {
            Some(record) => submit(&self.shared, record, reason),
            None => log::debug!("No progress to push for {} yet", self.shared.item_id),
        }
    }

    /// Final flush, then retirement
    ///
    /// The teardown push is fire-and-forget; the returned drain lets a caller
    /// that is about to exit wait a bounded time for it.
    pub fn stop(&mut self) -> SyncDrain {
        self.suspend();
        if self.is_alive() {
            self.flush(PushReason::Teardown);
            self.shared.alive.store(false, Ordering::Release);
        }
        self.drain()
    }

    /// Retires without a final push
    pub fn retire(&mut self) {
        self.suspend();
        self.shared.alive.store(false, Ordering::Release);
    }

    pub fn drain(&self) -> SyncDrain {
        SyncDrain {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            pushes_attempted: self.shared.attempted.load(Ordering::Relaxed),
            pushes_failed: self.shared.failed.load(Ordering::Relaxed),
            pushes_coalesced: self.shared.coalesced.load(Ordering::Relaxed),
            in_flight: self.shared.in_flight.load(Ordering::Acquire),
        }
    }
}

impl Drop for ProgressSynchronizer {
    fn drop(&mut self) {
        self.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, SyncResult};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        pushed: StdMutex<Vec<f64>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn push(&self, record: &ProgressRecord) -> SyncResult<()> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.pushed.lock().unwrap().push(record.current_time);
            if self.fail.load(Ordering::SeqCst) {
                Err(SyncError::Push("HTTP 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn fixed_poll(position: f64) -> ProgressPoll {
        Arc::new(move || Some(ProgressRecord::new(ItemId::new("li_1"), position, 3600.0)))
    }

    fn sync_with(sink: Arc<RecordingSink>, position: f64) -> ProgressSynchronizer {
        ProgressSynchronizer::start(
            sink,
            SyncConfig::default(),
            ItemId::new("li_1"),
            fixed_poll(position),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_while_busy_is_coalesced() {
        let sink = Arc::new(RecordingSink::default());
        let sync = sync_with(Arc::clone(&sink), 10.0);

        sync.tick();
        sync.tick();
        sync.drain().settled().await;

        assert_eq!(sink.pushed.lock().unwrap().len(), 1);
        let stats = sync.stats();
        assert_eq!(stats.pushes_attempted, 1);
        assert_eq!(stats.pushes_coalesced, 1);
        assert!(!stats.in_flight);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_parked_transition_wins() {
        let sink = Arc::new(RecordingSink::default());
        let sync = sync_with(Arc::clone(&sink), 10.0);

        sync.tick();
        sync.push_record(
            ProgressRecord::new(ItemId::new("li_1"), 11.0, 3600.0),
            PushReason::Pause,
        );
        sync.push_record(
            ProgressRecord::new(ItemId::new("li_1"), 12.0, 3600.0),
            PushReason::Pause,
        );
        sync.drain().settled().await;

        assert_eq!(*sink.pushed.lock().unwrap(), vec![10.0, 12.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_counted_not_raised() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let sync = sync_with(Arc::clone(&sink), 10.0);

        sync.flush(PushReason::Pause);
        sync.drain().settled().await;

        assert_eq!(sync.stats().pushes_failed, 1);
        assert!(sync.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_pushes_once_then_ignores_requests() {
        let sink = Arc::new(RecordingSink::default());
        let mut sync = sync_with(Arc::clone(&sink), 42.0);

        let drain = sync.stop();
        sync.tick();
        sync.flush(PushReason::Pause);
        assert!(drain.settled_within(Duration::from_secs(3)).await);

        assert_eq!(*sink.pushed.lock().unwrap(), vec![42.0]);
        assert!(!sync.is_alive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_timer_has_no_immediate_tick() {
        let sink = Arc::new(RecordingSink::default());
        let mut sync = sync_with(Arc::clone(&sink), 5.0);

        sync.resume();
        tokio::time::sleep(Duration::from_secs(14)).await;
        assert!(sink.pushed.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.pushed.lock().unwrap().len(), 1);

        sync.suspend();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_without_progress_pushes_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let sync = ProgressSynchronizer::start(
            Arc::clone(&sink) as Arc<dyn ProgressSink>,
            SyncConfig::default(),
            ItemId::new("li_1"),
            Arc::new(|| None),
        );

        sync.flush(PushReason::Pause);
        sync.drain().settled().await;
        assert_eq!(sync.stats().pushes_attempted, 0);
    }
}

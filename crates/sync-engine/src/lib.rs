// crates/sync-engine/src/lib.rs
//! Listening-progress synchronization
//!
//! A session owns one `ProgressSynchronizer`, which pushes `ProgressRecord`s to
//! a `ProgressSink`:
//! - every interval while playing
//! - once on each transition into pause, at the end of the book and at teardown
//!
//! Failures are logged and counted, never surfaced.
//!
//! # Example
//!
//! ```rust,no_run
//! use shelfplay_core::{ItemId, ProgressRecord};
//! use shelfplay_sync_engine::{ProgressSink, ProgressSynchronizer, PushReason, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn demo(sink: Arc<dyn ProgressSink>) {
//! let poll = Arc::new(|| Some(ProgressRecord::new(ItemId::new("li_1"), 15.0, 3600.0)));
//! let mut sync = ProgressSynchronizer::start(sink, SyncConfig::default(), ItemId::new("li_1"), poll);
//! sync.resume();
//! sync.flush(PushReason::Pause);
//! sync.stop().settled().await;
//! # }
//! ```

mod error;
mod sink;
mod synchronizer;
mod types;

pub use error::{SyncError, SyncResult};
pub use sink::{GatewaySink, ProgressSink};
pub use synchronizer::{ProgressPoll, ProgressSynchronizer, SyncDrain};
pub use types::{PushReason, SyncConfig, SyncStats};

// crates/sync-engine/src/types.rs
//! Sync configuration and bookkeeping types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a push was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushReason {
    /// Interval tick while playing
    Periodic,
    /// Playback paused (by the user or the sleep timer)
    Pause,
    /// Playback reached the end
    Finished,
    /// Session closing
    Teardown,
}

impl PushReason {
    /// Transition pushes are parked while busy instead of dropped
    pub fn is_transition(self) -> bool {
        !matches!(self, PushReason::Periodic)
    }
}

impl std::fmt::Display for PushReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushReason::Periodic => write!(f, "periodic"),
            PushReason::Pause => write!(f, "pause"),
            PushReason::Finished => write!(f, "finished"),
            PushReason::Teardown => write!(f, "teardown"),
        }
    }
}

/// Configuration for the synchronizer
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between periodic pushes while playing
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
        }
    }
}

impl SyncConfig {
    pub fn with_interval_secs(secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(secs.max(1)),
        }
    }
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Requests handed to the sink
    pub pushes_attempted: u64,
    /// Requests the sink failed
    pub pushes_failed: u64,
    /// Periodic pushes dropped because one was in flight
    pub pushes_coalesced: u64,
    /// Whether a request is outstanding right now
    pub in_flight: bool,
}

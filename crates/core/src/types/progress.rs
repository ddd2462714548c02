//! Listening progress records

use crate::types::{ItemId, Timestamp};
use serde::{Deserialize, Serialize};

/// Trailing window, in seconds, within which an item counts as finished
pub const FINISHED_TOLERANCE_SECS: f64 = 10.0;

/// Server-side progress for one item
///
/// The server owns these; the client reads one at session start to find the
/// resume position and writes new ones while listening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(alias = "libraryItemId")]
    pub item_id: ItemId,
    pub current_time: f64,
    pub duration: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub last_update: Timestamp,
}

impl ProgressRecord {
    /// Builds a record for the given position, deriving `progress` and `is_finished`
    pub fn new(item_id: ItemId, current_time: f64, duration: f64) -> Self {
        let current_time = if current_time.is_finite() {
            current_time.max(0.0)
        } else {
            0.0
        };
        let progress = if duration > 0.0 {
            (current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            item_id,
            current_time,
            duration,
            progress,
            is_finished: Self::is_finished_at(current_time, duration),
            last_update: Timestamp::now(),
        }
    }

    /// Builds a terminal record marking the item as fully listened
    pub fn finished(item_id: ItemId, duration: f64) -> Self {
        let mut record = Self::new(item_id, duration, duration);
        record.is_finished = true;
        record.progress = 1.0;
        record
    }

    /// The finished rule: within the trailing tolerance of a positive duration
    pub fn is_finished_at(current_time: f64, duration: f64) -> bool {
        duration > 0.0 && current_time >= duration - FINISHED_TOLERANCE_SECS
    }

    /// Where a new session should start from this record
    ///
    /// Finished items start over from the beginning.
    pub fn resume_position(&self) -> f64 {
        if self.is_finished {
            0.0
        } else {
            self.current_time.max(0.0)
        }
    }
}

//! Chapter domain model

use serde::{Deserialize, Serialize};

/// A named segment of an item's timeline, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter index (0-based)
    pub index: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (exclusive, except for the last chapter)
    pub end: f64,
    pub title: String,
}

impl Chapter {
    /// Creates a new chapter
    pub fn new(index: usize, title: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            index,
            start,
            end,
            title: title.into(),
        }
    }

    /// Returns the chapter length in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Checks if a given position falls within this chapter
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }
}

//! Chapter-granular sleep timer
//!
//! "Stop after N chapters" becomes an absolute timeline target: the end of
//! chapter `min(last, current + N - 1)`. The target is recomputed when N or the
//! current chapter changes and compared against the position on every tick.

use crate::chapters::ChapterIndex;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Upper bound for the chapter countdown
pub const MAX_SLEEP_CHAPTERS: u8 = 10;

/// How the current chapter changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterChange {
    /// Playback ran forward across one or more boundaries
    Natural,
    /// A seek or chapter skip
    Jump,
}

/// Read model of the timer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SleepTimerState {
    pub chapters_remaining: u8,
    pub target_time: Option<f64>,
}

impl SleepTimerState {
    pub fn is_armed(&self) -> bool {
        self.target_time.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SleepTimer {
    state: SleepTimerState,
    epsilon: f64,
}

impl SleepTimer {
    /// `epsilon` is how far ahead of the target the timer may fire
    pub fn new(epsilon: f64) -> Self {
        Self {
            state: SleepTimerState::default(),
            epsilon: epsilon.max(0.0),
        }
    }

    pub fn state(&self) -> SleepTimerState {
        self.state
    }

    /// Sets the countdown; 0 disables the timer
    pub fn set_chapters(
        &mut self,
        chapters: u8,
        current: Option<usize>,
        index: &ChapterIndex,
    ) -> EngineResult<Option<f64>> {
        if chapters > MAX_SLEEP_CHAPTERS {
            return Err(EngineError::InvalidArgument {
                argument: "chapters".to_string(),
                reason: format!("must be between 0 and {}", MAX_SLEEP_CHAPTERS),
            });
        }
        self.state.chapters_remaining = chapters;
        Ok(self.evaluate(current, index))
    }

    /// Recomputes the target for the current chapter
    pub fn evaluate(&mut self, current: Option<usize>, index: &ChapterIndex) -> Option<f64> {
        let n = self.state.chapters_remaining as usize;
        self.state.target_time = match (n, current, index.last_index()) {
            (0, _, _) => None,
            (_, Some(current), Some(last)) => {
                let target = last.min(current + n - 1);
                index.get(target).map(|chapter| chapter.end)
            }
            _ => None,
        };
        self.state.target_time
    }

    /// Applies a change of current chapter
    ///
    /// A natural forward crossing from `a` to `b` uses up `b - a` chapters of the
    /// countdown, so the target stays where it was. Jumps re-evaluate without
    /// consuming anything.
    pub fn on_chapter_change(
        &mut self,
        from: Option<usize>,
        to: Option<usize>,
        change: ChapterChange,
        index: &ChapterIndex,
    ) -> Option<f64> {
        if self.state.chapters_remaining == 0 {
            return None;
        }

        if let (ChapterChange::Natural, Some(a), Some(b)) = (change, from, to) {
            if b > a {
                let crossed = (b - a).min(u8::MAX as usize) as u8;
                self.state.chapters_remaining =
                    self.state.chapters_remaining.saturating_sub(crossed.max(1));
                if self.state.chapters_remaining == 0 {
                    // Ran past the target without a tick close enough to fire
                    self.state.target_time = None;
                    return None;
                }
            }
        }

        self.evaluate(to, index)
    }

    /// True exactly once, when `position` reaches the target
    pub fn check(&mut self, position: f64) -> bool {
        match self.state.target_time {
            Some(target) if position >= target - self.epsilon => {
                self.state = SleepTimerState::default();
                true
            }
            _ => false,
        }
    }

    /// No countdown set
    pub fn is_idle(&self) -> bool {
        self.state.chapters_remaining == 0
    }

    pub fn cancel(&mut self) {
        self.state = SleepTimerState::default();
    }
}

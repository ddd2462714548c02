// FILE: crates/media-engine/src/chapters.rs
//! Chapter index: position-to-chapter lookup over an item's timeline

use shelfplay_core::Chapter;

/// Boundaries closer than this are treated as the same instant
pub const BOUNDARY_TOLERANCE_SECS: f64 = 0.5;

/// Where a position falls inside its chapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterPosition {
    /// Chapter index (0-based)
    pub index: usize,
    /// Seconds until the chapter ends
    pub remaining_in_chapter: f64,
    /// 0.0 at the chapter start, 1.0 at its end; 0.0 for zero-length chapters
    pub fraction_complete: f64,
}

/// Immutable, normalized chapter partition of one item
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterIndex {
    chapters: Vec<Chapter>,
    starts: Vec<f64>,
    duration: f64,
}

impl ChapterIndex {
    /// Builds the index from server chapters
    ///
    /// Chapters are sorted by start and re-indexed, and each `end` is snapped to
    /// the next chapter's `start`. The first start snaps to 0 and the last end to
    /// `duration` when they are within `BOUNDARY_TOLERANCE_SECS`.
    pub fn build(chapters: &[Chapter], duration: f64) -> Self {
        let mut sorted: Vec<Chapter> = chapters
            .iter()
            .filter(|c| c.start.is_finite() && c.end.is_finite())
            .cloned()
            .collect();
        if sorted.len() != chapters.len() {
            log::warn!(
                "Dropped {} chapters with non-finite bounds",
                chapters.len() - sorted.len()
            );
        }
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

        let count = sorted.len();
        for i in 0..count {
            sorted[i].index = i;
            if i + 1 < count {
                let next_start = sorted[i + 1].start;
                let gap = next_start - sorted[i].end;
                if gap.abs() > BOUNDARY_TOLERANCE_SECS {
                    log::warn!(
                        "Chapter {} ends at {:.2}s but chapter {} starts at {:.2}s",
                        i,
                        sorted[i].end,
                        i + 1,
                        next_start
                    );
                }
                sorted[i].end = next_start;
            }
        }

        if let Some(first) = sorted.first_mut() {
            if first.start > 0.0 && first.start <= BOUNDARY_TOLERANCE_SECS {
                first.start = 0.0;
            } else if first.start > BOUNDARY_TOLERANCE_SECS {
                log::warn!("First chapter starts at {:.2}s", first.start);
            }
        }

        if let Some(last) = sorted.last_mut() {
            if duration > 0.0 {
                let diff = (last.end - duration).abs();
                if diff <= BOUNDARY_TOLERANCE_SECS {
                    last.end = duration;
                } else {
                    log::warn!(
                        "Last chapter ends at {:.2}s, item duration is {:.2}s",
                        last.end,
                        duration
                    );
                }
            }
            if last.end < last.start {
                last.end = last.start;
            }
        }

        let starts = sorted.iter().map(|c| c.start).collect();
        Self {
            chapters: sorted,
            starts,
            duration,
        }
    }

    /// Chapter containing `time`, by binary search over start times
    ///
    /// `start[i] <= time < start[i + 1]`; the last chapter also accepts
    /// `time == end`. `None` before the first chapter, past the last one, or
    /// when there are no chapters.
    pub fn index_at(&self, time: f64) -> Option<usize> {
        if !time.is_finite() {
            return None;
        }
        let after = self.starts.partition_point(|start| *start <= time);
        if after == 0 {
            return None;
        }
        let index = after - 1;
        if index == self.chapters.len() - 1 && time > self.chapters[index].end {
            return None;
        }
        Some(index)
    }

    /// Chapter containing `time` with in-chapter progress
    pub fn locate(&self, time: f64) -> Option<ChapterPosition> {
        let index = self.index_at(time)?;
        let chapter = &self.chapters[index];
        let length = chapter.end - chapter.start;
        let fraction_complete = if length > 0.0 {
            ((time - chapter.start) / length).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(ChapterPosition {
            index,
            remaining_in_chapter: (chapter.end - time).max(0.0),
            fraction_complete,
        })
    }

    /// Returns the total number of chapters
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Gets a chapter by index
    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn last_index(&self) -> Option<usize> {
        self.chapters.len().checked_sub(1)
    }

    /// Range that chapter skips are clamped to: first start to last start
    pub fn skip_bounds(&self) -> Option<(f64, f64)> {
        Some((self.chapters.first()?.start, self.chapters.last()?.start))
    }

    /// Formatted chapter info (e.g., "3/15")
    pub fn chapter_progress(&self, time: f64) -> String {
        match (self.index_at(time), self.len()) {
            (Some(idx), count) => format!("{}/{}", idx + 1, count),
            (None, count) if count > 0 => format!("-/{}", count),
            _ => "No chapters".to_string(),
        }
    }
}

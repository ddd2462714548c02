//! Domain types for shelfplay
//!
//! - `item`: library items, renditions and display metadata
//! - `chapter`: chapter segments of an item's timeline
//! - `progress`: server-side listening progress records
//! - `playback`: playback rate
//! - `common`: timestamps and shared traits

mod chapter;
mod common;
mod item;
mod playback;
mod progress;

pub use chapter::Chapter;
pub use common::{format_clock, Timestamp, Validator};
pub use item::{AudioRendition, ItemId, ItemMetadata, LibraryItem, RenditionKind};
pub use playback::PlaybackRate;
pub use progress::{ProgressRecord, FINISHED_TOLERANCE_SECS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let id = ItemId::new("li_123");
        let _ = ProgressRecord::new(id.clone(), 0.0, 10.0);
        let _ = Chapter::new(0, "Intro", 0.0, 10.0);
        let _ = PlaybackRate::default();
        let _ = Timestamp::now();
    }

    #[test]
    fn test_clock_formatting() {
        assert_eq!(format_clock(3665.0), "1:01:05");
    }
}

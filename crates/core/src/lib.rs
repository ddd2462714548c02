//! Shared domain model for shelfplay
//!
//! Everything the playback crates pass between each other lives here:
//! library items with their chapters and renditions, progress records,
//! and the user-facing error taxonomy.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result, StreamFailureKind};
pub use types::{
    format_clock, AudioRendition, Chapter, ItemId, ItemMetadata, LibraryItem, PlaybackRate,
    ProgressRecord, RenditionKind, Timestamp, Validator, FINISHED_TOLERANCE_SECS,
};

//! Library item domain models

use crate::types::{Chapter, Validator};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier for a library item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps a server item id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Display-only metadata published to now-playing surfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub title: String,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub series: Option<String>,
    pub cover_path: Option<String>,
}

impl ItemMetadata {
    /// Creates metadata with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// How a rendition is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenditionKind {
    /// Segmented delivery described by a manifest
    Adaptive,
    /// A single audio file
    Direct,
}

/// One concrete encoded representation of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRendition {
    pub kind: RenditionKind,
    /// Server-relative path or absolute URL
    pub url: String,
    pub mime_type: Option<String>,
    /// Bits per second, when the server reports it
    pub bitrate: Option<u32>,
}

impl AudioRendition {
    pub fn adaptive(url: impl Into<String>) -> Self {
        Self {
            kind: RenditionKind::Adaptive,
            url: url.into(),
            mime_type: Some("application/vnd.apple.mpegurl".to_string()),
            bitrate: None,
        }
    }

    pub fn direct(url: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            kind: RenditionKind::Direct,
            url: url.into(),
            mime_type,
            bitrate: None,
        }
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// A remote audiobook as fetched for a playback session
///
/// Immutable once fetched; the session that opened it owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: ItemId,
    /// Authoritative total length in seconds
    pub duration: f64,
    pub chapters: Vec<Chapter>,
    pub renditions: Vec<AudioRendition>,
    pub metadata: ItemMetadata,
}

impl LibraryItem {
    /// Creates an item with no chapters or renditions
    pub fn new(id: ItemId, duration: f64, metadata: ItemMetadata) -> Self {
        Self {
            id,
            duration,
            chapters: Vec::new(),
            renditions: Vec::new(),
            metadata,
        }
    }

    pub fn with_chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.chapters = chapters;
        self
    }

    pub fn with_rendition(mut self, rendition: AudioRendition) -> Self {
        self.renditions.push(rendition);
        self
    }

    /// Returns the first rendition of the given kind
    pub fn rendition(&self, kind: RenditionKind) -> Option<&AudioRendition> {
        self.renditions.iter().find(|r| r.kind == kind)
    }

    pub fn has_rendition(&self, kind: RenditionKind) -> bool {
        self.rendition(kind).is_some()
    }
}

impl Validator for LibraryItem {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.as_str().trim().is_empty() {
            errors.push("Item id must not be empty".to_string());
        }

        if !self.duration.is_finite() || self.duration < 0.0 {
            errors.push(format!("Invalid duration: {}", self.duration));
        }

        if self.renditions.is_empty() {
            errors.push("Item has no audio renditions".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

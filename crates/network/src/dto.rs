// crates/network/src/dto.rs
//! Wire shapes of the library server's JSON
//!
//! These mirror the server's field names and are converted into core types at
//! the gateway boundary so nothing else sees them.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use shelfplay_core::{
    AudioRendition, Chapter, ItemId, ItemMetadata, LibraryItem, ProgressRecord, Validator,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemDto {
    pub id: String,
    pub media: MediaDto,
    #[serde(default)]
    pub cover_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaDto {
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub chapters: Vec<ChapterDto>,
    #[serde(default, alias = "audioFiles")]
    pub tracks: Vec<TrackDto>,
    #[serde(default)]
    pub metadata: MetadataDto,
    #[serde(default)]
    pub cover_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterDto {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackDto {
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub bit_rate: Option<u32>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetadataDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub narrator_name: Option<String>,
}

impl ItemDto {
    /// Converts to a `LibraryItem`, adding the adaptive rendition at `manifest_path`
    pub fn into_item(self, manifest_path: Option<String>) -> GatewayResult<LibraryItem> {
        let media = self.media;

        let track_total: f64 = media.tracks.iter().filter_map(|t| t.duration).sum();
        let chapter_end = media.chapters.iter().map(|c| c.end).fold(0.0_f64, f64::max);
        let duration = media
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(if track_total > 0.0 {
                track_total
            } else {
                chapter_end
            });

        let chapters = media
            .chapters
            .into_iter()
            .enumerate()
            .map(|(index, c)| {
                let title = if c.title.trim().is_empty() {
                    format!("Chapter {}", index + 1)
                } else {
                    c.title
                };
                Chapter::new(index, title, c.start, c.end)
            })
            .collect();

        let metadata = ItemMetadata {
            title: media.metadata.title.unwrap_or_else(|| self.id.clone()),
            author: media.metadata.author_name,
            narrator: media.metadata.narrator_name,
            series: media.metadata.series_name,
            cover_path: self.cover_path.or(media.cover_path),
        };

        let mut item = LibraryItem::new(ItemId::new(self.id), duration, metadata)
            .with_chapters(chapters);

        if let Some(path) = manifest_path {
            item = item.with_rendition(AudioRendition::adaptive(path));
        }

        // Multi-file items only stream adaptively; a single track is a direct rendition
        if let [track] = media.tracks.as_slice() {
            if let Some(url) = &track.content_url {
                let mut direct = AudioRendition::direct(url.clone(), track.mime_type.clone());
                if let Some(bitrate) = track.bit_rate {
                    direct = direct.with_bitrate(bitrate);
                }
                item = item.with_rendition(direct);
            }
        }

        item.validate()
            .map_err(|errors| GatewayError::Decode(errors.join("; ")))?;
        Ok(item)
    }
}

/// Body of a progress upsert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub current_time: f64,
    pub duration: f64,
    pub progress: f64,
    pub is_finished: bool,
}

impl From<&ProgressRecord> for ProgressUpdate {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            current_time: record.current_time,
            duration: record.duration,
            progress: record.progress,
            is_finished: record.is_finished,
        }
    }
}

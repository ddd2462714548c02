//! HLS playlist parsing
//!
//! Only what audio streaming needs: master playlists (`#EXT-X-STREAM-INF`),
//! media playlists (`#EXTINF`, `#EXT-X-TARGETDURATION`, `#EXT-X-MEDIA-SEQUENCE`,
//! `#EXT-X-MAP`, `#EXT-X-ENDLIST`). Unknown tags are ignored.

use crate::error::ManifestError;

/// One rendition listed by a master playlist
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub uri: String,
    /// Peak bits per second
    pub bandwidth: u64,
    pub codecs: Option<String>,
}

/// One segment of a media playlist
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSegment {
    pub uri: String,
    pub sequence: u64,
    /// Offset of the segment's first sample on the item timeline
    pub start: f64,
    pub duration: f64,
}

impl MediaSegment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaPlaylist {
    pub target_duration: f64,
    pub media_sequence: u64,
    /// Initialization section (`#EXT-X-MAP`)
    pub init_uri: Option<String>,
    pub segments: Vec<MediaSegment>,
    /// `#EXT-X-ENDLIST` seen
    pub complete: bool,
}

impl MediaPlaylist {
    pub fn total_duration(&self) -> f64 {
        self.segments.last().map(MediaSegment::end).unwrap_or(0.0)
    }

    /// Index of the segment containing `time`, clamped to the playlist
    pub fn segment_index_at(&self, time: f64) -> usize {
        if self.segments.is_empty() {
            return 0;
        }
        let after = self.segments.partition_point(|s| s.start <= time.max(0.0));
        after.saturating_sub(1).min(self.segments.len() - 1)
    }

    /// Up to `count` segments starting with the one containing `time`
    pub fn window(&self, time: f64, count: usize) -> &[MediaSegment] {
        if self.segments.is_empty() {
            return &[];
        }
        let first = self.segment_index_at(time);
        let last = (first + count).min(self.segments.len());
        &self.segments[first..last]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Playlist {
    Master(Vec<Variant>),
    Media(MediaPlaylist),
}

/// Parses a playlist body
pub fn parse_playlist(text: &str) -> Result<Playlist, ManifestError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, "#EXTM3U")) => {}
        _ => return Err(ManifestError::MissingHeader),
    }

    let mut variants = Vec::new();
    let mut pending_variant: Option<(u64, Option<String>)> = None;

    let mut media = MediaPlaylist::default();
    let mut pending_duration: Option<f64> = None;
    let mut next_start = 0.0;
    let mut is_media = false;

    for (line_no, line) in lines {
        if let Some(attrs) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            let attrs = parse_attributes(attrs);
            let bandwidth = attribute(&attrs, "BANDWIDTH")
                .ok_or_else(|| invalid(line_no, "STREAM-INF without BANDWIDTH"))?
                .parse::<u64>()
                .map_err(|_| invalid(line_no, "BANDWIDTH is not a number"))?;
            let codecs = attribute(&attrs, "CODECS").map(str::to_string);
            pending_variant = Some((bandwidth, codecs));
        } else if let Some(value) = line.strip_prefix("#EXTINF:") {
            is_media = true;
            let raw = value.split(',').next().unwrap_or_default().trim();
            let duration = raw
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| invalid(line_no, "EXTINF duration is not a number"))?;
            pending_duration = Some(duration);
        } else if let Some(value) = line.strip_prefix("#EXT-X-TARGETDURATION:") {
            is_media = true;
            media.target_duration = value
                .trim()
                .parse()
                .map_err(|_| invalid(line_no, "TARGETDURATION is not a number"))?;
        } else if let Some(value) = line.strip_prefix("#EXT-X-MEDIA-SEQUENCE:") {
            media.media_sequence = value
                .trim()
                .parse()
                .map_err(|_| invalid(line_no, "MEDIA-SEQUENCE is not a number"))?;
        } else if let Some(attrs) = line.strip_prefix("#EXT-X-MAP:") {
            let attrs = parse_attributes(attrs);
            media.init_uri = attribute(&attrs, "URI").map(str::to_string);
        } else if line == "#EXT-X-ENDLIST" {
            media.complete = true;
        } else if line.starts_with('#') {
            continue;
        } else if let Some((bandwidth, codecs)) = pending_variant.take() {
            variants.push(Variant {
                uri: line.to_string(),
                bandwidth,
                codecs,
            });
        } else if let Some(duration) = pending_duration.take() {
            let sequence = media.media_sequence + media.segments.len() as u64;
            media.segments.push(MediaSegment {
                uri: line.to_string(),
                sequence,
                start: next_start,
                duration,
            });
            next_start += duration;
        } else {
            return Err(invalid(line_no, "URI without a preceding tag"));
        }
    }

    if !variants.is_empty() && !is_media {
        Ok(Playlist::Master(variants))
    } else if !media.segments.is_empty() {
        Ok(Playlist::Media(media))
    } else {
        Err(ManifestError::Empty)
    }
}

/// Highest-bandwidth variant within `max_bitrate` (0 means no cap)
///
/// Falls back to the lowest variant when every one exceeds the cap.
pub fn select_variant(variants: &[Variant], max_bitrate: u64) -> Option<&Variant> {
    let within = variants
        .iter()
        .filter(|v| max_bitrate == 0 || v.bandwidth <= max_bitrate)
        .max_by_key(|v| v.bandwidth);
    within.or_else(|| variants.iter().min_by_key(|v| v.bandwidth))
}

fn invalid(line: usize, reason: &str) -> ManifestError {
    ManifestError::InvalidLine {
        line,
        reason: reason.to_string(),
    }
}

/// Splits `KEY=value,KEY="quoted, value"` lists
fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().to_string();
        rest = &rest[eq + 1..];

        let value;
        if let Some(quoted) = rest.strip_prefix('"') {
            let close = quoted.find('"').unwrap_or(quoted.len());
            value = quoted[..close].to_string();
            rest = quoted.get(close + 1..).unwrap_or_default();
        } else {
            let comma = rest.find(',').unwrap_or(rest.len());
            value = rest[..comma].trim().to_string();
            rest = &rest[comma..];
        }
        attrs.push((key, value));
        rest = rest.trim_start_matches(',').trim_start();
    }

    attrs
}

fn attribute<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

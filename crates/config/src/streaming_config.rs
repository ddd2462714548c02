//! Stream selection section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Rendition choice and adaptive streaming knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Use the adaptive manifest whenever the runtime can play it
    pub prefer_adaptive: bool,

    /// The transport plays HLS itself
    pub native_adaptive: bool,

    /// A software demuxer is available for HLS
    pub software_demuxer: bool,

    /// The transport can send an Authorization header with media requests
    pub header_auth: bool,

    /// Upper bound for variant selection in bits per second; 0 disables the cap
    pub max_bitrate: u64,

    /// Segments fetched ahead of the resume position when a session opens
    pub initial_window_segments: usize,

    /// Attempts per segment before the stream is declared unavailable
    pub segment_retry_attempts: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            prefer_adaptive: true,
            native_adaptive: false,
            software_demuxer: true,
            header_auth: true,
            max_bitrate: 0,
            initial_window_segments: 3,
            segment_retry_attempts: 4,
        }
    }
}

impl ConfigSection for StreamingConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.initial_window_segments,
                1,
                32,
                "streaming.initial_window_segments",
            ),
            Validator::in_range(
                self.segment_retry_attempts,
                1,
                10,
                "streaming.segment_retry_attempts",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.prefer_adaptive = other.prefer_adaptive;
        self.native_adaptive = other.native_adaptive;
        self.software_demuxer = other.software_demuxer;
        self.header_auth = other.header_auth;
        self.max_bitrate = other.max_bitrate;
        self.initial_window_segments = other.initial_window_segments;
        self.segment_retry_attempts = other.segment_retry_attempts;
    }

    fn section_name(&self) -> &'static str {
        "streaming"
    }
}

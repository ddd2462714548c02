//! Stream acquisition: turning an item and a resume position into a playable source
//!
//! The adaptive manifest is preferred whenever the runtime can play HLS, either
//! natively or through a software demuxer; otherwise the single direct file is
//! used. Once a strategy is chosen it is kept for the life of the handle.

use crate::error::{StreamError, StreamResult};
use crate::manifest::{parse_playlist, select_variant, MediaPlaylist, MediaSegment, Playlist};
use shelfplay_config::StreamingConfig;
use shelfplay_core::{AppError, LibraryItem, RenditionKind};
use shelfplay_network::{sign_optional, AuthMode, Bytes, GatewayError, MediaFetcher, SignedUrl, Url};
use shelfplay_resilience::{retry_async, RetryPolicy};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the playback runtime can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCapabilities {
    pub native_adaptive: bool,
    pub software_demuxer: bool,
    pub header_auth: bool,
}

impl PlaybackCapabilities {
    pub fn from_config(config: &StreamingConfig) -> Self {
        Self {
            native_adaptive: config.native_adaptive,
            software_demuxer: config.software_demuxer,
            header_auth: config.header_auth,
        }
    }

    pub fn supports_adaptive(&self) -> bool {
        self.native_adaptive || self.software_demuxer
    }

    /// How credentials must travel with media URLs
    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::for_transport(self.header_auth)
    }
}

impl Default for PlaybackCapabilities {
    fn default() -> Self {
        Self::from_config(&StreamingConfig::default())
    }
}

/// Tunables for acquisition and segment fetching
#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub prefer_adaptive: bool,
    /// Bits per second; 0 means uncapped
    pub max_bitrate: u64,
    pub initial_window_segments: usize,
    pub retry_policy: RetryPolicy,
}

impl StreamSettings {
    pub fn from_config(config: &StreamingConfig) -> Self {
        Self {
            prefer_adaptive: config.prefer_adaptive,
            max_bitrate: config.max_bitrate,
            initial_window_segments: config.initial_window_segments.max(1),
            retry_policy: RetryPolicy::new(config.segment_retry_attempts as usize)
                .with_initial_delay(Duration::from_millis(250))
                .with_max_delay(Duration::from_secs(4)),
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from_config(&StreamingConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStrategy {
    Adaptive,
    Direct,
}

impl fmt::Display for StreamStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStrategy::Adaptive => write!(f, "adaptive"),
            StreamStrategy::Direct => write!(f, "direct"),
        }
    }
}

/// Maps a gateway failure onto the stream taxonomy
///
/// Client errors mean the resource is not there; re-opening will not help.
fn stream_error(context: &str, err: GatewayError) -> StreamError {
    StreamError::Unavailable {
        reconnect: !err.is_client_error(),
        reason: format!("{}: {}", context, err),
    }
}

struct AdaptiveInner {
    fetcher: Arc<dyn MediaFetcher>,
    playlist_url: Url,
    playlist: MediaPlaylist,
    retry_policy: RetryPolicy,
    released: AtomicBool,
}

/// A parsed media playlist plus the means to fetch its segments
///
/// Clones share one session; releasing any clone releases them all.
#[derive(Clone)]
pub struct AdaptiveSession {
    inner: Arc<AdaptiveInner>,
}

impl AdaptiveSession {
    fn new(
        fetcher: Arc<dyn MediaFetcher>,
        playlist_url: Url,
        playlist: MediaPlaylist,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(AdaptiveInner {
                fetcher,
                playlist_url,
                playlist,
                retry_policy,
                released: AtomicBool::new(false),
            }),
        }
    }

    pub fn playlist(&self) -> &MediaPlaylist {
        &self.inner.playlist
    }

    pub fn playlist_url(&self) -> &Url {
        &self.inner.playlist_url
    }

    pub fn segment_count(&self) -> usize {
        self.inner.playlist.segments.len()
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Stops the session; later fetches fail with `StreamError::Released`
    pub fn release(&self) {
        if !self.inner.released.swap(true, Ordering::AcqRel) {
            log::debug!("Released adaptive session {}", self.inner.playlist_url);
        }
    }

    /// Index range of the segments covering `count` segments from `time`
    pub fn window_at(&self, time: f64, count: usize) -> std::ops::Range<usize> {
        let playlist = &self.inner.playlist;
        if playlist.segments.is_empty() {
            return 0..0;
        }
        let first = playlist.segment_index_at(time);
        first..(first + count).min(playlist.segments.len())
    }

    /// Fetches one segment, retrying transient faults
    ///
    /// Exhausted retries escalate to `StreamError::Unavailable`.
    pub async fn fetch_segment(&self, index: usize) -> StreamResult<Bytes> {
        let segment = self
            .inner
            .playlist
            .segments
            .get(index)
            .ok_or_else(|| StreamError::unavailable(format!("no segment {}", index)))?;
        self.fetch(&segment.uri, &format!("segment {}", segment.sequence))
            .await
    }

    /// Fetches the `#EXT-X-MAP` initialization section, if the playlist has one
    pub async fn fetch_init(&self) -> StreamResult<Option<Bytes>> {
        match &self.inner.playlist.init_uri {
            Some(uri) => self.fetch(uri, "init section").await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetches the initial window starting at `time`; returns bytes buffered
    pub async fn prime(&self, time: f64, count: usize) -> StreamResult<usize> {
        let mut buffered = self.fetch_init().await?.map(|b| b.len()).unwrap_or(0);
        for index in self.window_at(time, count) {
            buffered += self.fetch_segment(index).await?.len();
        }
        log::debug!(
            "Primed {} bytes of {} at {:.1}s",
            buffered,
            self.inner.playlist_url,
            time
        );
        Ok(buffered)
    }

    async fn fetch(&self, uri: &str, what: &str) -> StreamResult<Bytes> {
        if self.is_released() {
            return Err(StreamError::Released);
        }
        let url = self
            .inner
            .playlist_url
            .join(uri)
            .map_err(|e| StreamError::unavailable(format!("{} URI {}: {}", what, uri, e)))?;

        let fetcher = &self.inner.fetcher;
        let released = &self.inner.released;
        let mut attempt = 0;
        let result = retry_async(
            &self.inner.retry_policy,
            |e: &GatewayError| e.is_retryable() && !released.load(Ordering::Acquire),
            || {
                attempt += 1;
                let attempt = attempt;
                let url = &url;
                async move {
                    fetcher.get_bytes(url).await.map_err(|e| {
                        if e.is_retryable() {
                            log::debug!(
                                "{}",
                                AppError::TransientStreamFault {
                                    reason: format!("{}: {}", what, e),
                                    attempt,
                                }
                            );
                        }
                        e
                    })
                }
            },
        )
        .await;

        if self.is_released() {
            return Err(StreamError::Released);
        }

        result.map_err(|err| {
            log::warn!(
                "Giving up on {} after {} attempt(s): {}",
                what,
                err.attempts,
                err.last_error
            );
            if err.exhausted {
                StreamError::unavailable(format!(
                    "{} failed {} times: {}",
                    what, err.attempts, err.last_error
                ))
            } else {
                stream_error(what, err.last_error)
            }
        })
    }
}

impl fmt::Debug for AdaptiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveSession")
            .field("playlist_url", &self.inner.playlist_url.as_str())
            .field("segments", &self.segment_count())
            .field("released", &self.is_released())
            .finish()
    }
}

/// A ready-to-play media source
#[derive(Debug, Clone)]
pub struct StreamHandle {
    pub strategy: StreamStrategy,
    /// URL for the transport, with credentials attached the way it can carry them
    pub source: SignedUrl,
    /// Where playback should start
    pub start_offset: f64,
    /// Present for the adaptive strategy
    pub adaptive: Option<AdaptiveSession>,
}

impl StreamHandle {
    /// Tears down the adaptive session, if any
    pub fn release(&self) {
        if let Some(session) = &self.adaptive {
            session.release();
        }
    }

    /// Segment at `time`, for the adaptive strategy
    pub fn segment_at(&self, time: f64) -> Option<&MediaSegment> {
        let playlist = self.adaptive.as_ref()?.playlist();
        playlist.segments.get(playlist.segment_index_at(time))
    }
}

/// Chooses a strategy and prepares its source
#[derive(Clone)]
pub struct StreamAcquirer {
    fetcher: Arc<dyn MediaFetcher>,
    capabilities: PlaybackCapabilities,
    settings: StreamSettings,
}

impl StreamAcquirer {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        capabilities: PlaybackCapabilities,
        settings: StreamSettings,
    ) -> Self {
        Self {
            fetcher,
            capabilities,
            settings,
        }
    }

    pub fn capabilities(&self) -> PlaybackCapabilities {
        self.capabilities
    }

    /// The strategy `item` would be played with, without touching the network
    pub fn choose(&self, item: &LibraryItem) -> StreamResult<StreamStrategy> {
        let adaptive = item.has_rendition(RenditionKind::Adaptive);
        let direct = item.has_rendition(RenditionKind::Direct);
        let can_adaptive = self.capabilities.supports_adaptive();

        if adaptive && can_adaptive && (self.settings.prefer_adaptive || !direct) {
            Ok(StreamStrategy::Adaptive)
        } else if direct {
            Ok(StreamStrategy::Direct)
        } else if adaptive {
            Err(StreamError::NotSupported(
                "only an HLS stream is offered and this player cannot demux HLS".to_string(),
            ))
        } else {
            Err(StreamError::NotSupported(format!(
                "item {} has no playable rendition",
                item.id
            )))
        }
    }

    /// Produces a handle positioned at `resume`
    pub async fn acquire(&self, item: &LibraryItem, resume: f64) -> StreamResult<StreamHandle> {
        let resume = resume.clamp(0.0, item.duration.max(0.0));
        let strategy = self.choose(item)?;
        log::info!(
            "Acquiring {} stream for {} at {:.1}s",
            strategy,
            item.id,
            resume
        );

        match strategy {
            StreamStrategy::Adaptive => self.acquire_adaptive(item, resume).await,
            StreamStrategy::Direct => self.acquire_direct(item, resume).await,
        }
    }

    async fn acquire_direct(&self, item: &LibraryItem, resume: f64) -> StreamResult<StreamHandle> {
        let rendition = item
            .rendition(RenditionKind::Direct)
            .ok_or_else(|| StreamError::NotSupported("no direct rendition".to_string()))?;
        let url = self
            .fetcher
            .resolve(&rendition.url)
            .map_err(|e| stream_error("direct URL", e))?;

        let fetcher = &self.fetcher;
        retry_async(&self.settings.retry_policy, GatewayError::is_retryable, || {
            fetcher.check_reachable(&url)
        })
        .await
        .map_err(|err| stream_error("direct file", err.into_inner()))?;

        Ok(StreamHandle {
            strategy: StreamStrategy::Direct,
            source: sign_optional(self.fetcher.credential(), &url, self.capabilities.auth_mode()),
            start_offset: resume,
            adaptive: None,
        })
    }

    async fn acquire_adaptive(
        &self,
        item: &LibraryItem,
        resume: f64,
    ) -> StreamResult<StreamHandle> {
        let rendition = item
            .rendition(RenditionKind::Adaptive)
            .ok_or_else(|| StreamError::NotSupported("no adaptive rendition".to_string()))?;
        let mut url = self
            .fetcher
            .resolve(&rendition.url)
            .map_err(|e| stream_error("manifest URL", e))?;

        let mut playlist = self.load_playlist(&url).await?;
        if let Playlist::Master(variants) = &playlist {
            let variant = select_variant(variants, self.settings.max_bitrate)
                .ok_or_else(|| StreamError::unavailable("master playlist has no variants"))?;
            log::debug!(
                "Selected variant {} ({} bps) of {}",
                variant.uri,
                variant.bandwidth,
                item.id
            );
            url = url
                .join(&variant.uri)
                .map_err(|e| StreamError::unavailable(format!("variant URI: {}", e)))?;
            playlist = self.load_playlist(&url).await?;
        }

        let media = match playlist {
            Playlist::Media(media) => media,
            Playlist::Master(_) => {
                return Err(StreamError::Unavailable {
                    reason: "variant playlist is itself a master playlist".to_string(),
                    reconnect: false,
                })
            }
        };

        let session = AdaptiveSession::new(
            Arc::clone(&self.fetcher),
            url.clone(),
            media,
            self.settings.retry_policy.clone(),
        );

        if !self.capabilities.native_adaptive {
            if let Err(e) = session
                .prime(resume, self.settings.initial_window_segments)
                .await
            {
                session.release();
                return Err(e);
            }
        }

        Ok(StreamHandle {
            strategy: StreamStrategy::Adaptive,
            source: sign_optional(self.fetcher.credential(), &url, self.capabilities.auth_mode()),
            start_offset: resume,
            adaptive: Some(session),
        })
    }

    async fn load_playlist(&self, url: &Url) -> StreamResult<Playlist> {
        let fetcher = &self.fetcher;
        let text = retry_async(&self.settings.retry_policy, GatewayError::is_retryable, || {
            fetcher.get_text(url)
        })
        .await
        .map_err(|err| stream_error("manifest", err.into_inner()))?;

        parse_playlist(&text).map_err(|e| {
            log::warn!("Unusable manifest at {}: {}", url, e);
            StreamError::Unavailable {
                reason: format!("manifest: {}", e),
                reconnect: false,
            }
        })
    }
}

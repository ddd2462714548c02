// crates/network/src/gateway.rs
//! The seams between a playback session and the library server

use crate::auth::Credential;
use crate::client::{Client, ClientConfig};
use crate::dto::{ItemDto, ProgressUpdate};
use crate::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use shelfplay_config::{ServerConfig, ITEM_PLACEHOLDER};
use shelfplay_core::{ItemId, LibraryItem, ProgressRecord};
use shelfplay_resilience::RetryPolicy;
use std::time::Duration;

/// Item detail and progress records
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Item detail; a missing item is `GatewayError::NotFound`
    async fn fetch_item(&self, id: &ItemId) -> GatewayResult<LibraryItem>;

    /// Last stored progress; `Ok(None)` when the server has none
    async fn fetch_progress(&self, id: &ItemId) -> GatewayResult<Option<ProgressRecord>>;

    /// Idempotent upsert keyed by `record.item_id`
    async fn push_progress(&self, record: &ProgressRecord) -> GatewayResult<()>;
}

/// Raw media reads used by stream acquisition
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Base that server-relative references resolve against
    fn base_url(&self) -> &Url;

    /// Credential handed to transports along with media URLs
    fn credential(&self) -> Option<&Credential>;

    /// Resolves a server-relative path or absolute URL
    fn resolve(&self, reference: &str) -> GatewayResult<Url> {
        resolve_against(self.base_url(), reference)
    }

    async fn get_text(&self, url: &Url) -> GatewayResult<String>;

    async fn get_bytes(&self, url: &Url) -> GatewayResult<Bytes>;

    /// Checks the resource is reachable without downloading it
    async fn check_reachable(&self, url: &Url) -> GatewayResult<()>;
}

/// Joins `reference` onto `base`, keeping any path prefix the base carries
pub fn resolve_against(base: &Url, reference: &str) -> GatewayResult<Url> {
    if let Ok(absolute) = Url::parse(reference) {
        return Ok(absolute);
    }

    let mut prefix = base.clone();
    if !prefix.path().ends_with('/') {
        let path = format!("{}/", prefix.path());
        prefix.set_path(&path);
    }
    prefix
        .join(reference.trim_start_matches('/'))
        .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", reference, e)))
}

/// Server path templates, each containing `{item_id}`
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub item: String,
    pub progress_read: String,
    pub progress_write: String,
    pub manifest: String,
}

impl Endpoints {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            item: config.item_path.clone(),
            progress_read: config.primary_progress_path.clone(),
            progress_write: config.progress_path().to_string(),
            manifest: config.manifest_path.clone(),
        }
    }

    /// Substitutes the item id into a template
    pub fn expand(template: &str, id: &ItemId) -> String {
        template.replace(ITEM_PLACEHOLDER, id.as_str())
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// `MediaGateway` and `MediaFetcher` over HTTP
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(base_url: Url, endpoints: Endpoints, client: Client) -> Self {
        Self {
            client,
            base_url,
            endpoints,
        }
    }

    /// Builds the gateway described by the `[server]` config section
    pub fn from_config(config: &ServerConfig) -> GatewayResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let client_config = ClientConfig {
            timeout: Duration::from_secs(config.request_timeout_secs),
            retry_policy: Some(
                RetryPolicy::new(config.max_retries as usize + 1)
                    .with_initial_delay(Duration::from_millis(200)),
            ),
            ..ClientConfig::default()
        };
        let credential = config.bearer().and_then(Credential::bearer);
        let client = Client::with_config(client_config, credential)?;

        log::debug!(
            "Gateway for {} writes progress to {}",
            base_url,
            config.progress_path()
        );
        Ok(Self::new(base_url, Endpoints::from_config(config), client))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn endpoint(&self, template: &str, id: &ItemId) -> GatewayResult<Url> {
        self.resolve(&Endpoints::expand(template, id))
    }
}

#[async_trait]
impl MediaGateway for HttpGateway {
    async fn fetch_item(&self, id: &ItemId) -> GatewayResult<LibraryItem> {
        let url = self.endpoint(&self.endpoints.item, id)?;
        let dto: ItemDto = self.client.get_json(&url).await?;
        if dto.id != id.as_str() {
            log::warn!("Asked for item {} but server returned {}", id, dto.id);
        }
        let manifest = Endpoints::expand(&self.endpoints.manifest, id);
        dto.into_item(Some(manifest))
    }

    async fn fetch_progress(&self, id: &ItemId) -> GatewayResult<Option<ProgressRecord>> {
        let url = self.endpoint(&self.endpoints.progress_read, id)?;
        match self.client.get_json::<ProgressRecord>(&url).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn push_progress(&self, record: &ProgressRecord) -> GatewayResult<()> {
        let url = self.endpoint(&self.endpoints.progress_write, &record.item_id)?;
        self.client
            .patch_json(&url, &ProgressUpdate::from(record))
            .await
    }
}

#[async_trait]
impl MediaFetcher for HttpGateway {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn credential(&self) -> Option<&Credential> {
        self.client.credential()
    }

    async fn get_text(&self, url: &Url) -> GatewayResult<String> {
        self.client.get_text(url).await
    }

    async fn get_bytes(&self, url: &Url) -> GatewayResult<Bytes> {
        self.client.get_bytes(url).await
    }

    async fn check_reachable(&self, url: &Url) -> GatewayResult<()> {
        self.client.head(url).await.map(|_| ())
    }
}

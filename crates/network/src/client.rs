// crates/network/src/client.rs
//! HTTP client wrapper with retries and bearer auth

use crate::auth::Credential;
use crate::error::{GatewayError, GatewayResult};
use bytes::Bytes;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shelfplay_resilience::{retry_async, RetryPolicy};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Retry policy for idempotent reads
    pub retry_policy: Option<RetryPolicy>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("shelfplay/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            retry_policy: Some(RetryPolicy::new(3).with_initial_delay(Duration::from_millis(200))),
        }
    }
}

/// HTTP client that authenticates every request it sends
#[derive(Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
    credential: Option<Credential>,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> GatewayResult<Self> {
        Self::with_config(ClientConfig::default(), None)
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig, credential: Option<Credential>) -> GatewayResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            inner: client,
            config,
            credential,
        })
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> GatewayResult<T> {
        let response = self.send_idempotent(|| self.inner.get(url.clone())).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(format!("{}: {}", url, e)))
    }

    /// GET a text body
    pub async fn get_text(&self, url: &Url) -> GatewayResult<String> {
        let response = self.send_idempotent(|| self.inner.get(url.clone())).await?;
        Ok(response.text().await?)
    }

    /// GET a binary body
    pub async fn get_bytes(&self, url: &Url) -> GatewayResult<Bytes> {
        let response = self.send_idempotent(|| self.inner.get(url.clone())).await?;
        Ok(response.bytes().await?)
    }

    /// HEAD request; succeeds when the resource is reachable
    pub async fn head(&self, url: &Url) -> GatewayResult<Response> {
        self.send_idempotent(|| self.inner.head(url.clone())).await
    }

    /// PATCH a JSON body once
    ///
    /// Not retried here; callers that write decide whether a later write supersedes it.
    pub async fn patch_json<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> GatewayResult<()> {
        self.send_once(self.inner.patch(url.clone()).json(body))
            .await
            .map(|_| ())
    }

    async fn send_idempotent<F>(&self, build: F) -> GatewayResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        match &self.config.retry_policy {
            Some(policy) => retry_async(policy, GatewayError::is_retryable, || {
                self.send_once(build())
            })
            .await
            .map_err(|e| e.into_inner()),
            None => self.send_once(build()).await,
        }
    }

    async fn send_once(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let request = match &self.credential {
            Some(credential) => match credential.header_value() {
                Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
                None => request,
            },
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        if status == reqwest::StatusCode::NOT_FOUND {
            Err(GatewayError::NotFound(url))
        } else {
            Err(GatewayError::Status {
                status: status.as_u16(),
                url,
            })
        }
    }
}

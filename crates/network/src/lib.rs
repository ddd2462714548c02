// crates/network/src/lib.rs
//! Library server access for playback sessions
//!
//! `MediaGateway` covers item detail and progress records, `MediaFetcher` covers
//! manifests, segments and reachability checks. `HttpGateway` implements both
//! over reqwest.

mod auth;
mod client;
mod dto;
mod error;
mod gateway;

pub use auth::{sign_optional, AuthMode, Credential, SignedUrl, TOKEN_QUERY_PARAM};
pub use client::{Client, ClientConfig};
pub use dto::ProgressUpdate;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{resolve_against, Endpoints, HttpGateway, MediaFetcher, MediaGateway};

pub use bytes::Bytes;
pub use reqwest::header::{HeaderName, HeaderValue};
pub use reqwest::Url;

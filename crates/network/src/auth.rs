// crates/network/src/auth.rs
//! Bearer credentials for media requests
//!
//! Some players can attach an `Authorization` header to the requests they make
//! for audio; others can only be handed a URL. The credential supports both.

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use std::fmt;

/// Query parameter carrying the token when headers are unavailable
pub const TOKEN_QUERY_PARAM: &str = "token";

/// How a credential is attached to a media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <token>`
    Header,
    /// `?token=<token>`
    Query,
}

impl AuthMode {
    /// Picks the mode a transport can use
    pub fn for_transport(header_auth: bool) -> Self {
        if header_auth {
            AuthMode::Header
        } else {
            AuthMode::Query
        }
    }
}

/// A URL plus whatever headers must accompany it
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    pub url: Url,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl SignedUrl {
    /// A URL that needs no extra headers
    pub fn bare(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }
}

/// Bearer token issued by the library server
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    /// Returns `None` for a blank token
    pub fn bearer(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self {
                token: token.trim().to_string(),
            })
        }
    }

    /// The `Authorization` header value
    pub fn header_value(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token)).ok()?;
        value.set_sensitive(true);
        Some(value)
    }

    /// Attaches the credential to `url` in the requested mode
    pub fn sign(&self, url: &Url, mode: AuthMode) -> SignedUrl {
        match mode {
            AuthMode::Header => {
                let headers = self
                    .header_value()
                    .map(|value| vec![(AUTHORIZATION, value)])
                    .unwrap_or_default();
                SignedUrl {
                    url: url.clone(),
                    headers,
                }
            }
            AuthMode::Query => {
                let mut signed = url.clone();
                let existing: Vec<(String, String)> = signed
                    .query_pairs()
                    .filter(|(k, _)| k != TOKEN_QUERY_PARAM)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                {
                    let mut pairs = signed.query_pairs_mut();
                    pairs.clear();
                    pairs.extend_pairs(existing);
                    pairs.append_pair(TOKEN_QUERY_PARAM, &self.token);
                }
                SignedUrl::bare(signed)
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Signs `url` when a credential is present
pub fn sign_optional(credential: Option<&Credential>, url: &Url, mode: AuthMode) -> SignedUrl {
    match credential {
        Some(credential) => credential.sign(url, mode),
        None => SignedUrl::bare(url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_blank_token_is_no_credential() {
        assert!(Credential::bearer("").is_none());
        assert!(Credential::bearer("  ").is_none());
        assert!(Credential::bearer("abc").is_some());
    }

    #[test]
    fn test_header_mode_leaves_url_alone() {
        let cred = Credential::bearer("abc").unwrap();
        let signed = cred.sign(&url("http://h/hls/li_1/output.m3u8"), AuthMode::Header);

        assert_eq!(signed.url.as_str(), "http://h/hls/li_1/output.m3u8");
        assert_eq!(signed.headers.len(), 1);
        assert_eq!(signed.headers[0].0, AUTHORIZATION);
        assert_eq!(signed.headers[0].1.to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_query_mode_appends_token() {
        let cred = Credential::bearer("abc").unwrap();
        let signed = cred.sign(&url("http://h/file.mp3?ts=1"), AuthMode::Query);

        assert!(signed.headers.is_empty());
        assert_eq!(signed.url.as_str(), "http://h/file.mp3?ts=1&token=abc");
    }

    #[test]
    fn test_query_mode_replaces_stale_token() {
        let cred = Credential::bearer("new").unwrap();
        let signed = cred.sign(&url("http://h/f?token=old"), AuthMode::Query);
        assert_eq!(signed.url.query(), Some("token=new"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::bearer("secret").unwrap();
        assert!(!format!("{:?}", cred).contains("secret"));
    }

    #[test]
    fn test_mode_for_transport() {
        assert_eq!(AuthMode::for_transport(true), AuthMode::Header);
        assert_eq!(AuthMode::for_transport(false), AuthMode::Query);
    }
}

// crates/network/src/error.rs
//! Error types for gateway operations

use shelfplay_core::AppError;
use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the library server
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server has no such resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success status other than 404
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The body did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// A URL or path template could not be resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Returns true if repeating the request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Status { status, .. } => *status >= 500 || *status == 429,
            GatewayError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GatewayError::NotFound(_) | GatewayError::Decode(_) | GatewayError::InvalidUrl(_) => {
                false
            }
        }
    }

    /// Returns true for 404 responses
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            GatewayError::NotFound(_) => true,
            GatewayError::Status { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::stream_fault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::InvalidUrl("::".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_retryable_statuses() {
        let server = GatewayError::Status {
            status: 503,
            url: "http://h/x".to_string(),
        };
        let throttled = GatewayError::Status {
            status: 429,
            url: "http://h/x".to_string(),
        };
        let forbidden = GatewayError::Status {
            status: 403,
            url: "http://h/x".to_string(),
        };

        assert!(server.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!forbidden.is_retryable());
        assert!(forbidden.is_client_error());
    }

    #[test]
    fn test_not_found_is_final() {
        let err = GatewayError::NotFound("/api/items/x".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }
}

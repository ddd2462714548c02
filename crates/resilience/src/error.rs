// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    /// The error was not retryable; gave up after this many attempts
    #[error("Non-retryable failure after {attempts} attempt(s): {error}")]
    Aborted { attempts: usize, error: String },
}

impl ResilienceError {
    /// Number of attempts made before giving up, if any were made
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::RetriesExhausted { attempts, .. } | Self::Aborted { attempts, .. } => {
                Some(*attempts)
            }
            Self::Timeout(_) => None,
        }
    }
}

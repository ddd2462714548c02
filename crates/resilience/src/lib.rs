// crates/resilience/src/lib.rs
//! Resilience patterns for network-facing operations
//!
//! - Retry with exponential backoff for async operations
//! - Timeouts for futures that must not block teardown
//!
//! # Example
//!
//! ```rust
//! use shelfplay_resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3)
//!     .with_initial_delay(Duration::from_millis(100));
//! assert_eq!(policy.max_attempts(), 3);
//! ```

mod error;
mod retry;
mod timeout;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{retry_async, RetryError, RetryPolicy};
pub use timeout::{with_timeout, Timeout};

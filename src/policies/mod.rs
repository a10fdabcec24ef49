//! Retry policy.
//!
//! Controls how long a task waits before re-attempting after a failed sync:
//! a capped exponential backoff span that replaces the configured interval
//! until the next success.

mod retry;

pub use retry::RetryPolicy;

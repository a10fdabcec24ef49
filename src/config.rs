//! Global scheduler configuration.

use crate::policies::RetryPolicy;

/// Engine-wide settings, fixed at build time.
///
/// Per-task settings live in [`crate::settings`]; this struct only carries
/// knobs that apply to the engine as a whole.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Capacity of the broadcast event bus. Values below 1 are clamped to 1.
    pub bus_capacity: usize,
    /// Backoff policy applied after failed sync attempts.
    pub retry: RetryPolicy,
    /// Stable device identity strings hashed into the jitter seed when no
    /// seed is persisted yet. Leave empty to derive a random seed instead.
    pub identity: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            retry: RetryPolicy::default(),
            identity: Vec::new(),
        }
    }
}

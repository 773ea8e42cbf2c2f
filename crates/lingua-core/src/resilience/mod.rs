//! Resilience policy: retries, per-attempt timeouts, and a per-provider
//! circuit breaker.

pub mod clock;
pub mod outcome;
pub mod policy;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use outcome::{AttemptOutcome, ERROR_MARKER, PolicyError};
pub use policy::ResiliencePolicy;

/// Per-call adjustments to the configured policy.
///
/// Overrides apply to one call only; the shared circuit state is still
/// keyed by provider name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Replaces `max_retries` for this call.
    pub max_retries_override: Option<u32>,
    /// Replaces `attempt_timeout_ms` for this call.
    pub attempt_timeout_override: Option<Duration>,
    /// Hard stop for the whole call. Each attempt's timer fires at whichever
    /// comes first: its own timeout or this deadline.
    pub deadline: Option<tokio::time::Instant>,
}

impl ExecutionOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries_override = Some(max_retries);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout_override = Some(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: tokio::time::Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

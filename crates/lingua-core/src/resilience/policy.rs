//! Per-provider retry, timeout, and circuit breaker.
//!
//! Each provider name has a lazily created [`CircuitState`] in a `DashMap`.
//! Guards are taken only for the read or read-modify-write of that state and
//! never live across an `.await`.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use lingua_observe::spans::attempt_span;
use lingua_types::config::ResilienceConfig;
use lingua_types::{CircuitPhase, CircuitSnapshot};

use super::ExecutionOptions;
use super::clock::{Clock, SystemClock};
use super::outcome::{AttemptOutcome, PolicyError};

/// Breaker bookkeeping for one provider.
#[derive(Debug, Clone, Copy, Default)]
struct CircuitState {
    consecutive_failures: u32,
    /// Set when the threshold is reached; cleared only by a success.
    opened_at: Option<Instant>,
}

/// Result of one guarded attempt.
enum AttemptResult {
    Success(String),
    /// Counts toward the retry budget.
    Failure(PolicyError),
    /// Ends the call immediately with no circuit bookkeeping.
    Abort(PolicyError),
}

/// Retry/timeout/circuit-breaker wrapper shared by every call in the process.
#[derive(Debug)]
pub struct ResiliencePolicy {
    config: ResilienceConfig,
    clock: Arc<dyn Clock>,
    circuits: DashMap<String, CircuitState>,
}

impl ResiliencePolicy {
    pub fn new(config: ResilienceConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Use a custom clock for circuit cool-down timing.
    pub fn with_clock(config: ResilienceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            circuits: DashMap::new(),
        }
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    /// Run `operation` under the policy for `provider`.
    ///
    /// The closure receives a cancellation token for each attempt. The token
    /// fires when the attempt loses to its timeout, to the overall deadline,
    /// or to `cancel`.
    ///
    /// After all attempts fail the provider's consecutive failure count goes
    /// up by one; reaching `failure_threshold` opens the circuit. While open
    /// and inside the cool-down, calls fail fast with
    /// [`PolicyError::CircuitOpen`] without invoking the closure. The first
    /// call after the cool-down is let through as a half-open probe.
    pub async fn execute<F, Fut, O>(
        &self,
        provider: &str,
        mut operation: F,
        cancel: &CancellationToken,
        options: ExecutionOptions,
    ) -> Result<String, PolicyError>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = O>,
        O: Into<AttemptOutcome>,
    {
        if cancel.is_cancelled() {
            return Err(PolicyError::Cancelled);
        }
        self.admit(provider)?;

        let max_retries = options.max_retries_override.unwrap_or(self.config.max_retries);
        let attempt_timeout = options
            .attempt_timeout_override
            .unwrap_or(Duration::from_millis(self.config.attempt_timeout_ms));

        let mut attempt: u32 = 0;
        loop {
            let result = self
                .run_attempt(provider, &mut operation, cancel, attempt_timeout, options.deadline)
                .instrument(attempt_span(provider, attempt))
                .await;

            match result {
                AttemptResult::Success(payload) => {
                    self.record_success(provider);
                    return Ok(payload);
                }
                AttemptResult::Abort(err) => {
                    tracing::debug!(provider, attempt, error = %err, "Attempt aborted");
                    return Err(err);
                }
                AttemptResult::Failure(err) if attempt < max_retries => {
                    tracing::warn!(
                        provider,
                        attempt,
                        retries_left = max_retries - attempt,
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    attempt += 1;
                }
                AttemptResult::Failure(err) => {
                    tracing::warn!(provider, attempts = attempt + 1, error = %err, "All attempts failed");
                    self.record_failure(provider);
                    return Err(err);
                }
            }
        }
    }

    /// Legacy string form of [`execute`](Self::execute): failures come back
    /// as an `ERROR:`-prefixed payload.
    pub async fn execute_payload<F, Fut, O>(
        &self,
        provider: &str,
        operation: F,
        cancel: &CancellationToken,
        options: ExecutionOptions,
    ) -> String
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = O>,
        O: Into<AttemptOutcome>,
    {
        match self.execute(provider, operation, cancel, options).await {
            Ok(payload) => payload,
            Err(err) => err.to_payload(),
        }
    }

    /// True while the circuit is open and the cool-down has not elapsed.
    ///
    /// Unknown providers report closed.
    pub fn is_circuit_open(&self, provider: &str) -> bool {
        self.circuits
            .get(provider)
            .is_some_and(|state| self.phase_of(&state) == CircuitPhase::Open)
    }

    /// Point-in-time view of a provider's breaker.
    pub fn circuit_snapshot(&self, provider: &str) -> CircuitSnapshot {
        let state = self
            .circuits
            .get(provider)
            .map(|entry| *entry.value())
            .unwrap_or_default();

        let phase = self.phase_of(&state);
        let open_remaining_ms = match (phase, state.opened_at) {
            (CircuitPhase::Open, Some(opened_at)) => {
                let elapsed = self.clock.now().saturating_duration_since(opened_at);
                let remaining = self.open_duration().saturating_sub(elapsed);
                Some(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
            }
            _ => None,
        };

        CircuitSnapshot {
            provider: provider.to_string(),
            phase,
            consecutive_failures: state.consecutive_failures,
            open_remaining_ms,
        }
    }

    fn open_duration(&self) -> Duration {
        Duration::from_millis(self.config.circuit_open_duration_ms)
    }

    fn phase_of(&self, state: &CircuitState) -> CircuitPhase {
        match state.opened_at {
            None => CircuitPhase::Closed,
            Some(opened_at)
                if self.clock.now().saturating_duration_since(opened_at) < self.open_duration() =>
            {
                CircuitPhase::Open
            }
            Some(_) => CircuitPhase::HalfOpen,
        }
    }

    fn admit(&self, provider: &str) -> Result<(), PolicyError> {
        let phase = match self.circuits.get(provider) {
            Some(state) => self.phase_of(&state),
            None => return Ok(()),
        };

        match phase {
            CircuitPhase::Open => {
                tracing::debug!(provider, "Circuit open, failing fast");
                Err(PolicyError::CircuitOpen {
                    provider: provider.to_string(),
                })
            }
            CircuitPhase::HalfOpen => {
                tracing::info!(provider, "Circuit cool-down elapsed, allowing probe call");
                Ok(())
            }
            CircuitPhase::Closed => Ok(()),
        }
    }

    fn record_success(&self, provider: &str) {
        let mut state = self.circuits.entry(provider.to_string()).or_default();
        let was_open = state.opened_at.take().is_some();
        state.consecutive_failures = 0;
        drop(state);

        if was_open {
            tracing::info!(provider, "Circuit closed after successful call");
        }
    }

    fn record_failure(&self, provider: &str) {
        let now = self.clock.now();
        let mut state = self.circuits.entry(provider.to_string()).or_default();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        let failures = state.consecutive_failures;

        if failures >= self.config.failure_threshold {
            let reopened = state.opened_at.is_some();
            state.opened_at = Some(now);
            drop(state);
            tracing::warn!(
                provider,
                consecutive_failures = failures,
                cool_down_ms = self.config.circuit_open_duration_ms,
                reopened,
                "Circuit opened"
            );
        }
    }

    async fn run_attempt<F, Fut, O>(
        &self,
        provider: &str,
        operation: &mut F,
        cancel: &CancellationToken,
        attempt_timeout: Duration,
        deadline: Option<tokio::time::Instant>,
    ) -> AttemptResult
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = O>,
        O: Into<AttemptOutcome>,
    {
        let now = tokio::time::Instant::now();
        let timeout_at = now + attempt_timeout;
        let (fires_at, budget_bound) = match deadline {
            Some(deadline) if deadline <= timeout_at => (deadline, true),
            _ => (timeout_at, false),
        };

        if budget_bound && fires_at <= now {
            return AttemptResult::Abort(PolicyError::BudgetExceeded {
                provider: provider.to_string(),
            });
        }

        let attempt_token = cancel.child_token();
        // The call sits inside the guarded future so a panic before the
        // closure's own future exists is caught too.
        let work = AssertUnwindSafe(async { operation(attempt_token.clone()).await }).catch_unwind();

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                attempt_token.cancel();
                AttemptResult::Abort(PolicyError::Cancelled)
            }
            _ = tokio::time::sleep_until(fires_at) => {
                attempt_token.cancel();
                if budget_bound {
                    AttemptResult::Abort(PolicyError::BudgetExceeded {
                        provider: provider.to_string(),
                    })
                } else {
                    AttemptResult::Failure(PolicyError::TimedOut {
                        provider: provider.to_string(),
                        timeout_ms: u64::try_from(attempt_timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                }
            }
            outcome = work => match outcome {
                Ok(output) => match output.into() {
                    AttemptOutcome::Success(payload) => AttemptResult::Success(payload),
                    AttemptOutcome::Failure(message) => AttemptResult::Failure(PolicyError::Failed {
                        provider: provider.to_string(),
                        message,
                    }),
                },
                Err(payload) => AttemptResult::Failure(PolicyError::Failed {
                    provider: provider.to_string(),
                    message: format!("attempt panicked: {}", panic_message(payload.as_ref())),
                }),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

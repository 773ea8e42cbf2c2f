//! Fallback orchestration across an ordered provider chain.
//!
//! Providers are tried strictly one after another in the caller's order;
//! no two providers of one call ever run concurrently. Each attempt goes
//! through the shared [`ResiliencePolicy`], and every outcome is mirrored
//! into the [`HealthTracker`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use lingua_observe::spans::{orchestration_span, record_provider_used};
use lingua_types::config::LinguaConfig;
use lingua_types::{
    HealthSnapshot, OrchestrationError, ProviderRequest, ProviderResult, TranslationContext,
};

use crate::health::HealthTracker;
use crate::provider::box_provider::BoxTranslationProvider;
use crate::provider::capability::{self, Eligibility, Requirements, SkipReason};
use crate::provider::registry::ProviderRegistry;
use crate::resilience::{ExecutionOptions, PolicyError, ResiliencePolicy};

/// Default bound on a single out-of-band health check.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Entry point for translation calls.
///
/// Cheap to share behind an `Arc`; all mutable state lives in the policy
/// and the health tracker.
#[derive(Debug)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    policy: Arc<ResiliencePolicy>,
    health: Arc<HealthTracker>,
    probe_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        policy: Arc<ResiliencePolicy>,
        health: Arc<HealthTracker>,
    ) -> Self {
        Self {
            registry,
            policy,
            health,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Build the policy and health tracker from configuration.
    pub fn from_config(registry: Arc<ProviderRegistry>, config: &LinguaConfig) -> Self {
        Self::new(
            registry,
            Arc::new(ResiliencePolicy::new(config.resilience.clone())),
            Arc::new(HealthTracker::new()),
        )
        .with_probe_timeout(Duration::from_millis(config.health.probe_timeout_ms))
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &Arc<ResiliencePolicy> {
        &self.policy
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    /// Translate `request` using the first provider in `provider_names` that
    /// succeeds.
    ///
    /// Always returns a [`ProviderResult`]; every failure mode is reported
    /// through `success == false` and the error text.
    ///
    /// - Unknown names are skipped.
    /// - Providers lacking a required capability are skipped without an
    ///   attempt or a health update.
    /// - Glossary hints are cleared for providers that cannot use them.
    /// - In short-segment mode retries are disabled and the whole call is
    ///   bounded by `request_budget_ms`; running out of budget ends the call
    ///   with `budget_exceeded` set and no further fallback.
    /// - Caller cancellation ends the call immediately.
    pub async fn execute<S: AsRef<str>>(
        &self,
        provider_names: &[S],
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: &CancellationToken,
    ) -> ProviderResult {
        let started = tokio::time::Instant::now();
        let short_segment = request.short_segment_mode;
        let budget_ms = short_segment.then_some(request.request_budget_ms);
        let deadline = budget_ms.map(|ms| started + Duration::from_millis(ms));

        let span = orchestration_span(
            &request.request_id.to_string(),
            provider_names.len(),
            short_segment,
            budget_ms,
        );

        let mut result = self
            .run_chain(provider_names, request, context, cancel, deadline)
            .instrument(span.clone())
            .await;

        result.round_trip_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if short_segment {
            result.budget_enforced = true;
        }

        if result.success {
            record_provider_used(&span, &result.provider_used);
        }
        span.in_scope(|| {
            if result.success {
                tracing::info!(
                    provider = %result.provider_used,
                    used_fallback = result.used_fallback_provider,
                    round_trip_ms = result.round_trip_ms,
                    "Translation succeeded"
                );
            } else {
                tracing::debug!(
                    error = result.error.as_deref().unwrap_or_default(),
                    budget_exceeded = result.budget_exceeded,
                    round_trip_ms = result.round_trip_ms,
                    "Translation failed"
                );
            }
        });

        result
    }

    async fn run_chain<S: AsRef<str>>(
        &self,
        provider_names: &[S],
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: &CancellationToken,
        deadline: Option<tokio::time::Instant>,
    ) -> ProviderResult {
        let first: Option<&str> = provider_names.first().map(|name| name.as_ref());
        let requirements = Requirements::of(request);

        let mut last_failure: Option<ProviderResult> = None;
        let mut skipped: Vec<&str> = Vec::new();
        let mut skip_reason: Option<SkipReason> = None;

        for name in provider_names {
            let name: &str = name.as_ref();
            let used_fallback = Some(name) != first;

            if cancel.is_cancelled() {
                return cancelled();
            }
            if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                tracing::warn!(provider = name, "Request budget spent before attempt");
                return budget_exceeded(last_failure, request.request_budget_ms);
            }

            let Some(provider) = self.registry.lookup(name) else {
                tracing::warn!(provider = name, "Provider not registered, skipping");
                continue;
            };

            let forward_glossary_hints = match capability::evaluate(requirements, provider.capabilities()) {
                Eligibility::Eligible {
                    forward_glossary_hints,
                } => forward_glossary_hints,
                Eligibility::Skip(reason) => {
                    tracing::debug!(provider = name, %reason, "Provider ineligible, skipping");
                    skipped.push(name);
                    skip_reason = Some(reason);
                    continue;
                }
            };
            let scoped = capability::scope_request(request, forward_glossary_hints);

            let mut options = ExecutionOptions::default();
            if request.short_segment_mode {
                options = options.with_max_retries(0);
            }
            if let Some(deadline) = deadline {
                options = options.with_deadline(deadline);
            }

            let outcome = self
                .attempt(&provider, &scoped, context, cancel, options)
                .await;

            match outcome {
                Ok(output) => {
                    self.health.record_success(name);
                    let mut result = ProviderResult::ok(output).with_provider(name);
                    result.used_fallback_provider = used_fallback;
                    return result;
                }
                Err(PolicyError::Cancelled) => return cancelled(),
                Err(PolicyError::BudgetExceeded { .. }) => {
                    let message = OrchestrationError::BudgetExceeded {
                        budget_ms: request.request_budget_ms,
                    }
                    .to_string();
                    tracing::warn!(provider = name, budget_ms = request.request_budget_ms, "Request budget exceeded");
                    self.health.record_failure(name, message.clone());
                    let mut result = ProviderResult::failed(message.clone())
                        .with_provider(name)
                        .into_budget_exceeded(message);
                    result.used_fallback_provider = used_fallback;
                    return result;
                }
                Err(err) => {
                    tracing::warn!(provider = name, error = %err, "Provider failed, falling back");
                    self.health.record_failure(name, err.to_string());
                    let mut result = ProviderResult::failed(err.to_string()).with_provider(name);
                    result.used_fallback_provider = used_fallback;
                    last_failure = Some(result);
                }
            }
        }

        if let Some(failure) = last_failure {
            tracing::error!(
                chain_len = provider_names.len(),
                error = failure.error.as_deref().unwrap_or_default(),
                "All providers exhausted"
            );
            return failure;
        }
        let error = match skip_reason {
            Some(reason) => OrchestrationError::NoEligibleProvider {
                candidates: skipped.join(", "),
                requirement: reason.to_string(),
            },
            None => OrchestrationError::Exhausted,
        };
        tracing::error!(chain_len = provider_names.len(), %error, "No provider attempted");
        ProviderResult::failed(error.to_string())
    }

    async fn attempt(
        &self,
        provider: &BoxTranslationProvider,
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: &CancellationToken,
        options: ExecutionOptions,
    ) -> Result<String, PolicyError> {
        self.policy
            .execute(
                provider.name(),
                move |token| provider.translate(request, context, token),
                cancel,
                options,
            )
            .await
    }

    /// Current health snapshots, sorted by provider name.
    pub fn health_snapshots(&self) -> Vec<HealthSnapshot> {
        self.health.get_all()
    }

    /// Run one out-of-band health check against `name` and record it.
    ///
    /// The check is bounded by the probe timeout; a timeout is recorded as
    /// unhealthy. Circuit state is never touched. Returns `None` for an
    /// unknown provider or when `cancel` fires first.
    pub async fn probe(&self, name: &str, cancel: &CancellationToken) -> Option<HealthSnapshot> {
        let provider = self.registry.lookup(name)?;
        let token = cancel.child_token();

        let mut snapshot = tokio::select! {
            biased;

            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(self.probe_timeout) => {
                token.cancel();
                HealthSnapshot::unhealthy(
                    name,
                    format!("health check timed out after {}ms", self.probe_timeout.as_millis()),
                )
            }
            snapshot = provider.health_check(token.clone()) => snapshot,
        };

        snapshot.provider = name.to_string();
        tracing::debug!(provider = name, status = %snapshot.status, "Health probe finished");
        self.health.record(snapshot.clone());
        Some(snapshot)
    }
}

fn cancelled() -> ProviderResult {
    ProviderResult::failed(OrchestrationError::Cancelled.to_string())
}

fn budget_exceeded(last_failure: Option<ProviderResult>, budget_ms: u64) -> ProviderResult {
    let message = OrchestrationError::BudgetExceeded { budget_ms }.to_string();
    last_failure
        .unwrap_or_else(|| ProviderResult::failed(message.clone()))
        .into_budget_exceeded(message)
}

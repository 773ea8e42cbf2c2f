//! Translation request/result types for Lingua.
//!
//! These types model the data shapes exchanged with provider adapters:
//! the immutable per-call request, the result handed back to the caller,
//! the capability flags used for candidate filtering, and the health and
//! circuit diagnostics reported per provider name.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// End-to-end budget applied to short-segment calls when none is given.
pub const DEFAULT_REQUEST_BUDGET_MS: u64 = 700;

fn default_request_budget_ms() -> u64 {
    DEFAULT_REQUEST_BUDGET_MS
}

/// Request for a single translation, shared by every provider in a chain.
///
/// Built once per call and never mutated afterwards; the orchestrator
/// derives provider-scoped copies (see [`ProviderRequest::without_glossary_hints`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Identifier used to correlate spans and logs for this call.
    #[serde(default = "Uuid::now_v7")]
    pub request_id: Uuid,
    pub input_text: String,
    pub target_language: String,
    /// Prompt or policy text forwarded to the backend verbatim.
    #[serde(default)]
    pub prompt_policy: String,
    /// Source term -> target term. Keys are unique by construction.
    #[serde(default)]
    pub glossary_hints: BTreeMap<String, String>,
    #[serde(default)]
    pub requires_streaming: bool,
    /// Interactive, latency-sensitive call: strict budget, no retries.
    #[serde(default)]
    pub short_segment_mode: bool,
    #[serde(default = "default_request_budget_ms")]
    pub request_budget_ms: u64,
}

impl ProviderRequest {
    pub fn new(input_text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            input_text: input_text.into(),
            target_language: target_language.into(),
            prompt_policy: String::new(),
            glossary_hints: BTreeMap::new(),
            requires_streaming: false,
            short_segment_mode: false,
            request_budget_ms: DEFAULT_REQUEST_BUDGET_MS,
        }
    }

    pub fn with_prompt_policy(mut self, prompt_policy: impl Into<String>) -> Self {
        self.prompt_policy = prompt_policy.into();
        self
    }

    /// Add a glossary hint. A repeated source term replaces the earlier target.
    pub fn with_glossary_hint(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.glossary_hints.insert(source.into(), target.into());
        self
    }

    pub fn with_streaming(mut self) -> Self {
        self.requires_streaming = true;
        self
    }

    /// Switch to short-segment mode with the given end-to-end budget.
    pub fn short_segment(mut self, budget_ms: u64) -> Self {
        self.short_segment_mode = true;
        self.request_budget_ms = budget_ms;
        self
    }

    /// Copy of this request with the glossary hints cleared.
    pub fn without_glossary_hints(&self) -> Self {
        Self {
            glossary_hints: BTreeMap::new(),
            ..self.clone()
        }
    }
}

/// Outcome of a translation call, either from one provider or from the
/// orchestrator as a whole.
///
/// Exactly one of `output` / `error` is set, matching `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    /// Provider that produced this result. Always non-empty on success.
    pub provider_used: String,
    /// True when the provider used was not the first name in the chain.
    pub used_fallback_provider: bool,
    /// A short-segment budget applied to this call.
    pub budget_enforced: bool,
    /// The short-segment budget ran out. Implies `success == false`.
    pub budget_exceeded: bool,
    pub round_trip_ms: u64,
}

impl ProviderResult {
    /// Successful result carrying the translated text.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            provider_used: String::new(),
            used_fallback_provider: false,
            budget_enforced: false,
            budget_exceeded: false,
            round_trip_ms: 0,
        }
    }

    /// Failed result carrying an error description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            provider_used: String::new(),
            used_fallback_provider: false,
            budget_enforced: false,
            budget_exceeded: false,
            round_trip_ms: 0,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider_used = provider.into();
        self
    }

    /// Mark this result as produced under an overrun short-segment budget.
    ///
    /// Forces `success = false`; a successful output is discarded because the
    /// caller's budget no longer allows it to be used.
    pub fn into_budget_exceeded(mut self, message: impl Into<String>) -> Self {
        if self.success {
            self.success = false;
            self.output = None;
            self.error = Some(message.into());
        }
        self.budget_enforced = true;
        self.budget_exceeded = true;
        self
    }
}

/// Feature flags a provider adapter advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub streaming: bool,
    pub glossary_hints: bool,
}

/// Domain context produced upstream (glossary scopes, guardrails) and handed
/// through to providers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationContext {
    /// Subject domain, e.g. "legal" or "medical".
    pub domain: Option<String>,
    /// Terms that must be rendered exactly as given.
    #[serde(default)]
    pub locked_terms: BTreeMap<String, String>,
    /// Free-form annotations from upstream components.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TranslationContext {
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_locked_term(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.locked_terms.insert(source.into(), target.into());
        self
    }
}

/// Last-observed liveness of a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(HealthStatus::Unknown),
            "healthy" => Ok(HealthStatus::Healthy),
            "unhealthy" => Ok(HealthStatus::Unhealthy),
            other => Err(format!("invalid health status: '{other}'")),
        }
    }
}

/// Health of one provider at one point in time. Last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub provider: String,
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub message: String,
}

impl HealthSnapshot {
    pub fn healthy(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status: HealthStatus::Healthy,
            checked_at: Utc::now(),
            message: "ok".to_string(),
        }
    }

    pub fn unhealthy(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status: HealthStatus::Unhealthy,
            checked_at: Utc::now(),
            message: message.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Circuit breaker phase as seen from outside the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitPhase {
    Closed,
    /// Failing fast until the cool-down elapses.
    Open,
    /// Cool-down elapsed; the next call is let through as a probe.
    HalfOpen,
}

impl fmt::Display for CircuitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitPhase::Closed => write!(f, "closed"),
            CircuitPhase::Open => write!(f, "open"),
            CircuitPhase::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Diagnostic view of one provider's circuit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    pub provider: String,
    pub phase: CircuitPhase,
    pub consecutive_failures: u32,
    /// Milliseconds left before a half-open probe is allowed (open only).
    pub open_remaining_ms: Option<u64>,
}

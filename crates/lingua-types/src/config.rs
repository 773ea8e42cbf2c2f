//! Configuration types for Lingua.
//!
//! `LinguaConfig` represents the top-level `lingua.toml` that controls the
//! resilience policy, the default fallback chain, health probing and logging.

use serde::{Deserialize, Serialize};

use crate::provider::DEFAULT_REQUEST_BUDGET_MS;

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinguaConfig {
    #[serde(default)]
    pub resilience: ResilienceConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub health: HealthProbeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A configuration value the policy cannot operate with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("resilience.failure_threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("resilience.attempt_timeout_ms must be greater than 0")]
    ZeroAttemptTimeout,

    #[error("orchestrator.default_request_budget_ms must be greater than 0")]
    ZeroRequestBudget,
}

impl LinguaConfig {
    /// Reject values the policy cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.resilience.failure_threshold == 0 {
            return Err(ConfigValidationError::ZeroFailureThreshold);
        }
        if self.resilience.attempt_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroAttemptTimeout);
        }
        if self.orchestrator.default_request_budget_ms == 0 {
            return Err(ConfigValidationError::ZeroRequestBudget);
        }
        Ok(())
    }
}

/// Circuit breaker, retry and timeout settings, fixed at policy construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Consecutive failed calls that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Additional attempts after the first one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Wall-clock budget of a single attempt.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Cool-down before a half-open probe is let through.
    #[serde(default = "default_circuit_open_duration_ms")]
    pub circuit_open_duration_ms: u64,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_max_retries() -> u32 {
    2
}

fn default_attempt_timeout_ms() -> u64 {
    5_000
}

fn default_circuit_open_duration_ms() -> u64 {
    30_000
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            max_retries: default_max_retries(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            circuit_open_duration_ms: default_circuit_open_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Provider names tried in order when the caller supplies no chain.
    #[serde(default)]
    pub default_chain: Vec<String>,
    #[serde(default = "default_request_budget_ms")]
    pub default_request_budget_ms: u64,
}

fn default_request_budget_ms() -> u64 {
    DEFAULT_REQUEST_BUDGET_MS
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_chain: Vec::new(),
            default_request_budget_ms: default_request_budget_ms(),
        }
    }
}

/// Out-of-band health probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthProbeConfig {
    /// Seconds between probe rounds; 0 disables the prober.
    #[serde(default)]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl Default for HealthProbeConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: 0,
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = LinguaConfig::default();
        assert_eq!(config.resilience.failure_threshold, 3);
        assert_eq!(config.resilience.max_retries, 2);
        assert_eq!(config.resilience.attempt_timeout_ms, 5_000);
        assert_eq!(config.resilience.circuit_open_duration_ms, 30_000);
        assert_eq!(config.orchestrator.default_request_budget_ms, 700);
        assert!(config.orchestrator.default_chain.is_empty());
        assert_eq!(config.health.probe_interval_secs, 0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: LinguaConfig = toml::from_str("").unwrap();
        assert_eq!(config, LinguaConfig::default());
    }

    #[test]
    fn test_deserialize_with_values() {
        let toml_str = r#"
[resilience]
failure_threshold = 5
max_retries = 0
attempt_timeout_ms = 1200

[orchestrator]
default_chain = ["deepl", "mt-local"]

[health]
probe_interval_secs = 30

[logging]
format = "json"
otel = true
"#;
        let config: LinguaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.resilience.failure_threshold, 5);
        assert_eq!(config.resilience.max_retries, 0);
        assert_eq!(config.resilience.attempt_timeout_ms, 1200);
        // Unset field in a present table still defaults
        assert_eq!(config.resilience.circuit_open_duration_ms, 30_000);
        assert_eq!(config.orchestrator.default_chain, vec!["deepl", "mt-local"]);
        assert_eq!(config.health.probe_interval_secs, 30);
        assert_eq!(config.health.probe_timeout_ms, 2_000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.otel);
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let mut config = LinguaConfig::default();
        config.resilience.failure_threshold = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err, ConfigValidationError::ZeroFailureThreshold);
        assert!(err.to_string().contains("failure_threshold"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_budget() {
        let mut config = LinguaConfig::default();
        config.resilience.attempt_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroAttemptTimeout));

        let mut config = LinguaConfig::default();
        config.orchestrator.default_request_budget_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroRequestBudget));
    }
}

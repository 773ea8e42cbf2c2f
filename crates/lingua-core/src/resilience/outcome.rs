//! Tagged attempt outcomes and policy errors.
//!
//! Attempt closures may signal failure either by returning an error or by
//! returning a text payload that starts with [`ERROR_MARKER`]. Both are
//! normalised into [`AttemptOutcome`] at the call site so the retry and
//! circuit logic only ever sees one shape.

use std::fmt;

use lingua_types::ProviderResult;

/// Reserved prefix marking a text payload as a failure.
pub const ERROR_MARKER: &str = "ERROR:";

/// Failure text used when a provider gives no description of its own.
const UNDESCRIBED_FAILURE: &str = "provider reported failure";

/// Result of a single attempt, after the `ERROR:` convention is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    /// Failure description, without the marker.
    Failure(String),
}

impl AttemptOutcome {
    /// Classify a legacy text payload.
    pub fn from_payload(payload: String) -> Self {
        match payload.strip_prefix(ERROR_MARKER) {
            Some(rest) => {
                let message = rest.trim();
                if message.is_empty() {
                    AttemptOutcome::Failure(UNDESCRIBED_FAILURE.to_string())
                } else {
                    AttemptOutcome::Failure(message.to_string())
                }
            }
            None => AttemptOutcome::Success(payload),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

impl From<String> for AttemptOutcome {
    fn from(payload: String) -> Self {
        AttemptOutcome::from_payload(payload)
    }
}

impl<E: fmt::Display> From<Result<String, E>> for AttemptOutcome {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(payload) => AttemptOutcome::from_payload(payload),
            Err(err) => AttemptOutcome::Failure(err.to_string()),
        }
    }
}

impl From<ProviderResult> for AttemptOutcome {
    fn from(result: ProviderResult) -> Self {
        if result.success {
            AttemptOutcome::from_payload(result.output.unwrap_or_default())
        } else {
            let error = result
                .error
                .unwrap_or_else(|| UNDESCRIBED_FAILURE.to_string());
            match AttemptOutcome::from_payload(error) {
                // A failed result is a failure whatever its text looks like
                AttemptOutcome::Success(text) | AttemptOutcome::Failure(text) => {
                    AttemptOutcome::Failure(text)
                }
            }
        }
    }
}

/// Why [`ResiliencePolicy::execute`](super::ResiliencePolicy::execute) did
/// not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Fail-fast: the closure was not invoked and no failure was counted.
    #[error("circuit is open for provider '{provider}'")]
    CircuitOpen { provider: String },

    #[error("provider '{provider}' timed out after {timeout_ms}ms")]
    TimedOut { provider: String, timeout_ms: u64 },

    /// The closure returned an error, an `ERROR:` payload, or panicked.
    #[error("{message}")]
    Failed { provider: String, message: String },

    /// The caller's cancellation fired. Not counted toward the circuit.
    #[error("cancelled by caller")]
    Cancelled,

    /// The overall call deadline elapsed. Not counted toward the circuit.
    #[error("request budget exhausted while waiting on provider '{provider}'")]
    BudgetExceeded { provider: String },
}

impl PolicyError {
    /// Legacy text form: the message behind the `ERROR:` marker.
    pub fn to_payload(&self) -> String {
        format!("{ERROR_MARKER} {self}")
    }

    /// Whether this error was produced by running out of attempts, i.e. it
    /// was charged against the provider's circuit.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            PolicyError::TimedOut { .. } | PolicyError::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_marker_is_failure() {
        let outcome = AttemptOutcome::from_payload("ERROR: upstream 503".to_string());
        assert_eq!(outcome, AttemptOutcome::Failure("upstream 503".to_string()));
    }

    #[test]
    fn payload_without_marker_is_success() {
        let outcome = AttemptOutcome::from("Guten Tag".to_string());
        assert_eq!(outcome, AttemptOutcome::Success("Guten Tag".to_string()));
    }

    #[test]
    fn marker_only_counts_at_start() {
        let outcome = AttemptOutcome::from("no ERROR: here".to_string());
        assert!(outcome.is_success());
    }

    #[test]
    fn bare_marker_gets_default_description() {
        for payload in ["ERROR:", "ERROR:   "] {
            let outcome = AttemptOutcome::from_payload(payload.to_string());
            assert_eq!(outcome, AttemptOutcome::Failure(UNDESCRIBED_FAILURE.to_string()));
        }
        let failed = AttemptOutcome::from(ProviderResult::failed("ERROR:"));
        assert_eq!(failed, AttemptOutcome::Failure(UNDESCRIBED_FAILURE.to_string()));
    }

    #[test]
    fn result_err_is_failure() {
        let outcome = AttemptOutcome::from(Err::<String, _>("connection reset"));
        assert_eq!(outcome, AttemptOutcome::Failure("connection reset".to_string()));
    }

    #[test]
    fn provider_result_conversion() {
        let ok = AttemptOutcome::from(ProviderResult::ok("Hola"));
        assert_eq!(ok, AttemptOutcome::Success("Hola".to_string()));

        let failed = AttemptOutcome::from(ProviderResult::failed("ERROR: quota"));
        assert_eq!(failed, AttemptOutcome::Failure("quota".to_string()));

        let unmarked = AttemptOutcome::from(ProviderResult::failed("quota"));
        assert_eq!(unmarked, AttemptOutcome::Failure("quota".to_string()));
    }

    #[test]
    fn error_payload_roundtrips_through_marker() {
        let err = PolicyError::Failed {
            provider: "deepl".to_string(),
            message: "upstream 503".to_string(),
        };
        assert_eq!(err.to_payload(), "ERROR: upstream 503");
        assert_eq!(
            AttemptOutcome::from_payload(err.to_payload()),
            AttemptOutcome::Failure("upstream 503".to_string())
        );
    }

    #[test]
    fn circuit_open_payload() {
        let err = PolicyError::CircuitOpen {
            provider: "deepl".to_string(),
        };
        assert!(err.to_payload().starts_with("ERROR: circuit is open"));
        assert!(!err.is_provider_failure());
    }
}

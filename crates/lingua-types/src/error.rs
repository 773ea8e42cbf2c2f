use thiserror::Error;

/// Failures decided by the orchestrator itself rather than by a provider.
///
/// The `Display` text is what the caller sees in `ProviderResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    /// Every registered candidate was filtered out by capability checks.
    #[error("no eligible provider: none of [{candidates}] supports {requirement}")]
    NoEligibleProvider {
        candidates: String,
        requirement: String,
    },

    /// Nothing could be attempted (empty chain or only unknown names).
    #[error("all providers exhausted")]
    Exhausted,

    #[error("request budget of {budget_ms}ms exceeded")]
    BudgetExceeded { budget_ms: u64 },

    #[error("request cancelled by caller")]
    Cancelled,
}

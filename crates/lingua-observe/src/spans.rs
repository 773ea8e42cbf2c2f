//! Span conventions for provider orchestration.
//!
//! Every orchestrator call runs inside an `orchestrate` span and every
//! provider attempt inside a `provider_attempt` span. Field names are
//! exported as constants so log queries and dashboards can rely on them.

use tracing::Span;

/// Correlation id of the translation request.
pub const REQUEST_ID: &str = "lingua.request.id";

/// Number of provider names in the caller's fallback chain.
pub const CHAIN_LEN: &str = "lingua.chain.len";

/// Whether the call runs in short-segment (interactive) mode.
pub const SHORT_SEGMENT: &str = "lingua.short_segment";

/// End-to-end budget in milliseconds (short-segment mode only).
pub const BUDGET_MS: &str = "lingua.budget_ms";

/// Provider that finally served the call. Recorded on the orchestrate span.
pub const PROVIDER_USED: &str = "lingua.provider.used";

/// Provider an attempt is made against.
pub const PROVIDER_NAME: &str = "lingua.provider.name";

/// Zero-based attempt index within one policy execution.
pub const ATTEMPT_INDEX: &str = "lingua.attempt.index";

/// Span covering one orchestrator call across the whole fallback chain.
///
/// `lingua.provider.used` starts empty; fill it with [`record_provider_used`].
pub fn orchestration_span(
    request_id: &str,
    chain_len: usize,
    short_segment: bool,
    budget_ms: Option<u64>,
) -> Span {
    tracing::info_span!(
        "orchestrate",
        lingua.request.id = %request_id,
        lingua.chain.len = chain_len,
        lingua.short_segment = short_segment,
        lingua.budget_ms = budget_ms,
        lingua.provider.used = tracing::field::Empty,
    )
}

/// Span covering a single attempt against one provider.
pub fn attempt_span(provider: &str, attempt: u32) -> Span {
    tracing::debug_span!(
        "provider_attempt",
        lingua.provider.name = %provider,
        lingua.attempt.index = attempt,
    )
}

/// Record the provider that served the call on an orchestrate span.
pub fn record_provider_used(span: &Span, provider: &str) {
    span.record(PROVIDER_USED, provider);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_share_prefix() {
        for name in [
            REQUEST_ID,
            CHAIN_LEN,
            SHORT_SEGMENT,
            BUDGET_MS,
            PROVIDER_USED,
            PROVIDER_NAME,
            ATTEMPT_INDEX,
        ] {
            assert!(name.starts_with("lingua."), "unexpected field name {name}");
        }
    }

    #[test]
    fn test_spans_build_without_subscriber() {
        let span = orchestration_span("req-1", 2, true, Some(150));
        record_provider_used(&span, "deepl");
        let _guard = span.enter();
        let attempt = attempt_span("deepl", 0);
        let _inner = attempt.enter();
    }
}

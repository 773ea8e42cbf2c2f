//! Capability negotiation between a request and a provider.
//!
//! Pure functions over (request requirements, provider capabilities), kept
//! table-shaped so every combination is visible and testable in one place.

use std::borrow::Cow;
use std::fmt;

use lingua_types::{ProviderCapabilities, ProviderRequest};

/// What a request demands from a candidate provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub streaming: bool,
}

impl Requirements {
    pub fn of(request: &ProviderRequest) -> Self {
        Self {
            streaming: request.requires_streaming,
        }
    }
}

/// Why a provider was not considered a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    StreamingUnsupported,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::StreamingUnsupported => write!(f, "streaming"),
        }
    }
}

/// Outcome of matching a provider against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Attempt the provider; glossary hints are forwarded only when it can use them.
    Eligible { forward_glossary_hints: bool },
    /// Never a candidate for this request: no attempt, no health update.
    Skip(SkipReason),
}

/// Decide whether `capabilities` can serve `requirements`.
///
/// | requires streaming | supports streaming | supports hints | result                 |
/// |--------------------|--------------------|----------------|------------------------|
/// | yes                | no                 | any            | skip                   |
/// | no / yes           | any / yes          | no             | eligible, hints cleared|
/// | no / yes           | any / yes          | yes            | eligible, hints kept   |
pub fn evaluate(requirements: Requirements, capabilities: ProviderCapabilities) -> Eligibility {
    match (requirements.streaming, capabilities.streaming) {
        (true, false) => Eligibility::Skip(SkipReason::StreamingUnsupported),
        _ => Eligibility::Eligible {
            forward_glossary_hints: capabilities.glossary_hints,
        },
    }
}

/// Build the provider-scoped request.
///
/// Borrows the caller's request unchanged when nothing needs stripping.
pub fn scope_request(request: &ProviderRequest, forward_glossary_hints: bool) -> Cow<'_, ProviderRequest> {
    if forward_glossary_hints || request.glossary_hints.is_empty() {
        Cow::Borrowed(request)
    } else {
        Cow::Owned(request.without_glossary_hints())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(streaming: bool, glossary_hints: bool) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming,
            glossary_hints,
        }
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            // (requires streaming, caps, expected)
            (false, caps(false, false), Eligibility::Eligible { forward_glossary_hints: false }),
            (false, caps(false, true), Eligibility::Eligible { forward_glossary_hints: true }),
            (false, caps(true, false), Eligibility::Eligible { forward_glossary_hints: false }),
            (false, caps(true, true), Eligibility::Eligible { forward_glossary_hints: true }),
            (true, caps(false, false), Eligibility::Skip(SkipReason::StreamingUnsupported)),
            (true, caps(false, true), Eligibility::Skip(SkipReason::StreamingUnsupported)),
            (true, caps(true, false), Eligibility::Eligible { forward_glossary_hints: false }),
            (true, caps(true, true), Eligibility::Eligible { forward_glossary_hints: true }),
        ];

        for (streaming, capabilities, expected) in cases {
            let actual = evaluate(Requirements { streaming }, capabilities);
            assert_eq!(actual, expected, "streaming={streaming} caps={capabilities:?}");
        }
    }

    #[test]
    fn test_requirements_from_request() {
        let request = ProviderRequest::new("x", "de").with_streaming();
        assert!(Requirements::of(&request).streaming);
        assert!(!Requirements::of(&ProviderRequest::new("x", "de")).streaming);
    }

    #[test]
    fn test_scope_request_strips_hints_when_unsupported() {
        let request = ProviderRequest::new("x", "de").with_glossary_hint("cat", "Katze");
        let scoped = scope_request(&request, false);
        assert!(matches!(scoped, Cow::Owned(_)));
        assert!(scoped.glossary_hints.is_empty());
    }

    #[test]
    fn test_scope_request_borrows_when_nothing_to_strip() {
        let with_hints = ProviderRequest::new("x", "de").with_glossary_hint("cat", "Katze");
        assert!(matches!(scope_request(&with_hints, true), Cow::Borrowed(_)));

        let without_hints = ProviderRequest::new("x", "de");
        assert!(matches!(scope_request(&without_hints, false), Cow::Borrowed(_)));
    }
}

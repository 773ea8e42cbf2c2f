//! Provider orchestration and resilience for Lingua.
//!
//! Leaf-first:
//! - [`provider`]: the capability contract every backend adapter implements,
//!   its object-safe box, the name-indexed registry and the capability
//!   decision table.
//! - [`resilience`]: per-provider circuit breaker + retry + timeout executor.
//! - [`health`]: last-known status per provider.
//! - [`orchestrator`]: walks a caller-ordered chain and falls back on failure.
//!
//! Depends only on `lingua-types` and `lingua-observe` -- never on
//! configuration files or any concrete backend client.

pub mod health;
pub mod orchestrator;
pub mod provider;
pub mod resilience;

#[cfg(test)]
pub(crate) mod test_support;

pub use health::HealthTracker;
pub use orchestrator::Orchestrator;
pub use provider::{BoxTranslationProvider, ProviderRegistry, TranslationProvider};
pub use resilience::{ExecutionOptions, ResiliencePolicy};

//! Shared data types for Lingua.
//!
//! This crate contains the plain data shapes exchanged between the caller,
//! the orchestrator and the provider adapters: translation requests and
//! results, provider capabilities, health snapshots, circuit diagnostics,
//! configuration, and the caller-visible error classes.
//!
//! Zero runtime dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod provider;

pub use error::OrchestrationError;
pub use provider::{
    CircuitPhase, CircuitSnapshot, HealthSnapshot, HealthStatus,
    ProviderCapabilities, ProviderRequest, ProviderResult, TranslationContext,
    DEFAULT_REQUEST_BUDGET_MS,
};

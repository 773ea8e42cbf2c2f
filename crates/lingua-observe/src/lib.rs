//! Observability for Lingua: subscriber initialisation and the span
//! conventions shared by the orchestrator and the resilience policy.

pub mod spans;
pub mod tracing_setup;

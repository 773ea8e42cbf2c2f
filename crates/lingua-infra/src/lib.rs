//! Process-level plumbing for Lingua.
//!
//! Loads `lingua.toml`, runs the background health prober, and wires the
//! registry, resilience policy, health tracker and orchestrator into one
//! [`LinguaRuntime`] per process.

pub mod config;
pub mod prober;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_support;

pub use runtime::LinguaRuntime;

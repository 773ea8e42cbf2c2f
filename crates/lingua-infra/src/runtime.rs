//! Process-wide runtime wiring.
//!
//! The registry, resilience policy, health tracker and orchestrator are
//! shared singletons: build one [`LinguaRuntime`] at startup and hand out
//! its [`Orchestrator`] to every caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lingua_core::{Orchestrator, ProviderRegistry};
use lingua_types::config::{LinguaConfig, LogFormat, LoggingConfig};
use lingua_types::{ProviderRequest, ProviderResult, TranslationContext};

use crate::config::resolve_request_budget_ms;
use crate::prober::spawn_health_prober;

/// Install the global tracing subscriber described by `[logging]`.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    lingua_observe::tracing_setup::init_tracing(config.format == LogFormat::Json, config.otel)
        .map_err(|err| anyhow::anyhow!("failed to initialise tracing: {err}"))
}

/// Flush the OpenTelemetry exporter, if one was installed by [`init_logging`].
pub fn shutdown_logging() {
    lingua_observe::tracing_setup::shutdown_tracing();
}

/// Owns the shared orchestration state and background tasks.
pub struct LinguaRuntime {
    config: LinguaConfig,
    orchestrator: Arc<Orchestrator>,
    cancel: CancellationToken,
    prober: Option<JoinHandle<()>>,
}

impl LinguaRuntime {
    /// Validate `config`, build the orchestrator over `registry`, and start
    /// the health prober when `health.probe_interval_secs > 0`.
    pub fn start(config: LinguaConfig, registry: Arc<ProviderRegistry>) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        for name in &config.orchestrator.default_chain {
            if registry.lookup(name).is_none() {
                tracing::warn!(provider = %name, "Default chain names an unregistered provider");
            }
        }

        let orchestrator = Arc::new(Orchestrator::from_config(registry, &config));
        let cancel = CancellationToken::new();

        let prober = if config.health.probe_interval_secs > 0 {
            tokio::runtime::Handle::try_current()
                .context("health prober needs a running tokio runtime")?;
            Some(spawn_health_prober(
                Arc::clone(&orchestrator),
                Vec::new(),
                Duration::from_secs(config.health.probe_interval_secs),
                cancel.child_token(),
            ))
        } else {
            None
        };

        tracing::info!(
            providers = orchestrator.registry().len(),
            default_chain = ?config.orchestrator.default_chain,
            prober = prober.is_some(),
            "Lingua runtime started"
        );

        Ok(Self {
            config,
            orchestrator,
            cancel,
            prober,
        })
    }

    pub fn config(&self) -> &LinguaConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Build a short-segment request whose budget comes from configuration
    /// unless `budget_override_ms` is given.
    pub fn short_segment_request(
        &self,
        input_text: impl Into<String>,
        target_language: impl Into<String>,
        budget_override_ms: Option<u64>,
    ) -> ProviderRequest {
        let budget_ms = resolve_request_budget_ms(&self.config, budget_override_ms);
        ProviderRequest::new(input_text, target_language).short_segment(budget_ms)
    }

    /// Run `request` against the configured default chain.
    pub async fn execute_default(
        &self,
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: &CancellationToken,
    ) -> ProviderResult {
        self.orchestrator
            .execute(self.config.orchestrator.default_chain.as_slice(), request, context, cancel)
            .await
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        self.cancel.cancel();
        if let Some(prober) = self.prober.take() {
            prober.await.context("health prober task failed")?;
        }
        tracing::info!("Lingua runtime stopped");
        Ok(())
    }
}

impl Drop for LinguaRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

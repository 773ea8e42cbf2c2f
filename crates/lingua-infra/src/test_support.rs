//! Fixed-answer provider for the runtime and prober tests.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio_util::sync::CancellationToken;

use lingua_core::TranslationProvider;
use lingua_types::{HealthSnapshot, ProviderRequest, ProviderResult, TranslationContext};

pub(crate) struct StaticProvider {
    name: String,
    answer: ProviderResult,
    health_checks: Arc<AtomicU32>,
}

impl StaticProvider {
    pub(crate) fn ok(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            answer: ProviderResult::ok(output),
            health_checks: Arc::new(AtomicU32::new(0)),
        }
    }

    pub(crate) fn failing(name: &str, error: &str) -> Self {
        Self {
            answer: ProviderResult::failed(error),
            ..Self::ok(name, "")
        }
    }

    pub(crate) fn health_checks(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.health_checks)
    }
}

impl TranslationProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    fn supports_glossary_hints(&self) -> bool {
        false
    }

    fn translate(
        &self,
        _request: &ProviderRequest,
        _context: &TranslationContext,
        _cancel: CancellationToken,
    ) -> impl Future<Output = ProviderResult> + Send {
        let answer = self.answer.clone();
        async move { answer }
    }

    fn health_check(
        &self,
        _cancel: CancellationToken,
    ) -> impl Future<Output = HealthSnapshot> + Send {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        let snapshot = if self.answer.success {
            HealthSnapshot::healthy(&self.name)
        } else {
            HealthSnapshot::unhealthy(&self.name, "static outage")
        };
        async move { snapshot }
    }
}

//! Scripted provider used by the unit tests in this crate.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lingua_types::{HealthSnapshot, ProviderRequest, ProviderResult, TranslationContext};

use crate::provider::TranslationProvider;

/// Provider whose answers are fixed up front.
///
/// Results are taken from `script` in order; once it runs dry every call
/// returns `fallback`.
pub(crate) struct ScriptedProvider {
    name: String,
    streaming: bool,
    glossary_hints: bool,
    script: Mutex<VecDeque<ProviderResult>>,
    fallback: ProviderResult,
    delay: Option<Duration>,
    healthy: bool,
    health_delay: Option<Duration>,
    calls: Arc<AtomicU32>,
    seen_hints: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
}

impl ScriptedProvider {
    fn with_fallback(name: &str, fallback: ProviderResult) -> Self {
        Self {
            name: name.to_string(),
            streaming: false,
            glossary_hints: false,
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            healthy: true,
            health_delay: None,
            calls: Arc::new(AtomicU32::new(0)),
            seen_hints: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn ok(name: &str, output: &str) -> Self {
        Self::with_fallback(name, ProviderResult::ok(output))
    }

    pub(crate) fn failing(name: &str, error: &str) -> Self {
        Self::with_fallback(name, ProviderResult::failed(error)).unhealthy()
    }

    /// Results returned before falling back to the fixed answer.
    pub(crate) fn with_script(self, script: Vec<ProviderResult>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub(crate) fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub(crate) fn with_glossary_hints(mut self) -> Self {
        self.glossary_hints = true;
        self
    }

    /// Sleep this long before every translate answer.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep this long before every health answer.
    pub(crate) fn with_health_delay(mut self, delay: Duration) -> Self {
        self.health_delay = Some(delay);
        self
    }

    pub(crate) fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Shared translate-call counter.
    pub(crate) fn calls(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }

    /// Glossary hints as received by each translate call.
    pub(crate) fn seen_hints(&self) -> Arc<Mutex<Vec<BTreeMap<String, String>>>> {
        Arc::clone(&self.seen_hints)
    }
}

impl TranslationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    fn supports_glossary_hints(&self) -> bool {
        self.glossary_hints
    }

    fn translate(
        &self,
        request: &ProviderRequest,
        _context: &TranslationContext,
        _cancel: CancellationToken,
    ) -> impl Future<Output = ProviderResult> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_hints
            .lock()
            .unwrap()
            .push(request.glossary_hints.clone());
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }

    fn health_check(
        &self,
        _cancel: CancellationToken,
    ) -> impl Future<Output = HealthSnapshot> + Send {
        let snapshot = if self.healthy {
            HealthSnapshot::healthy(&self.name)
        } else {
            HealthSnapshot::unhealthy(&self.name, "scripted outage")
        };
        let delay = self.health_delay;

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            snapshot
        }
    }
}

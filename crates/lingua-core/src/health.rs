//! Provider health tracking.
//!
//! Last-known status per provider name, updated by the orchestrator after
//! every attempt outcome and by out-of-band probes. Purely diagnostic: the
//! fallback path never reads it.

use dashmap::DashMap;

use lingua_types::HealthSnapshot;

/// Last-write-wins store of provider health, keyed by provider name.
#[derive(Debug, Default)]
pub struct HealthTracker {
    snapshots: DashMap<String, HealthSnapshot>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    /// Mark `provider` healthy as of now.
    pub fn record_success(&self, provider: &str) {
        self.record(HealthSnapshot::healthy(provider));
    }

    /// Mark `provider` unhealthy as of now, keeping a short failure summary.
    pub fn record_failure(&self, provider: &str, summary: impl Into<String>) {
        self.record(HealthSnapshot::unhealthy(provider, summary));
    }

    /// Store a snapshot as-is, replacing whatever was there for its provider.
    pub fn record(&self, snapshot: HealthSnapshot) {
        tracing::trace!(
            provider = %snapshot.provider,
            status = %snapshot.status,
            "Health updated"
        );
        self.snapshots.insert(snapshot.provider.clone(), snapshot);
    }

    pub fn get(&self, provider: &str) -> Option<HealthSnapshot> {
        self.snapshots.get(provider).map(|entry| entry.value().clone())
    }

    /// Every recorded snapshot, sorted by provider name.
    pub fn get_all(&self) -> Vec<HealthSnapshot> {
        let mut all: Vec<HealthSnapshot> = self
            .snapshots
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.provider.cmp(&b.provider));
        all
    }
}

//! Background health prober.
//!
//! Periodically runs [`Orchestrator::probe`] against a provider list so the
//! health snapshots stay fresh for providers that see little traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use lingua_core::Orchestrator;

/// Spawn a task probing `providers` every `interval` until `cancel` fires.
///
/// An empty `providers` list means "every registered provider", re-read on
/// each round so hot-swapped registrations are picked up. The first round
/// runs immediately. Probes within a round run one at a time.
pub fn spawn_health_prober(
    orchestrator: Arc<Orchestrator>,
    providers: Vec<String>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Health prober started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let names = if providers.is_empty() {
                orchestrator.registry().names()
            } else {
                providers.clone()
            };

            for name in &names {
                if cancel.is_cancelled() {
                    break;
                }
                if orchestrator.probe(name, &cancel).await.is_none() && !cancel.is_cancelled() {
                    tracing::debug!(provider = %name, "Probe skipped, provider not registered");
                }
            }
        }

        tracing::info!("Health prober stopped");
    })
}

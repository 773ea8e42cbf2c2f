//! Provider registry for runtime provider lookup.
//!
//! A name-indexed registry of boxed translation providers, safe to share
//! across concurrent calls.

use std::sync::Arc;

use dashmap::DashMap;

use super::box_provider::BoxTranslationProvider;

/// Registry of available translation providers, indexed by name.
///
/// Lookups hand out `Arc` clones, so no map guard is ever held across an
/// `.await`. Registration order carries no meaning; callers supply the
/// fallback order per call.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<BoxTranslationProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
        }
    }

    /// Register a provider under its own name.
    ///
    /// An existing provider with the same name is replaced and returned
    /// (hot-swap, e.g. after credential rotation). Calls already holding the
    /// old instance finish against it.
    pub fn register(&self, provider: BoxTranslationProvider) -> Option<Arc<BoxTranslationProvider>> {
        let name = provider.name().to_string();
        let previous = self.providers.insert(name.clone(), Arc::new(provider));
        if previous.is_some() {
            tracing::info!(provider = %name, "Replaced registered provider");
        } else {
            tracing::debug!(provider = %name, "Registered provider");
        }
        previous
    }

    /// Look up a provider by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<BoxTranslationProvider>> {
        self.providers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a provider, returning it if it was registered.
    pub fn remove(&self, name: &str) -> Option<Arc<BoxTranslationProvider>> {
        self.providers.remove(name).map(|(_, provider)| provider)
    }

    /// All registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

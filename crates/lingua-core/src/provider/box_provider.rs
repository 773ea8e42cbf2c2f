//! BoxTranslationProvider -- object-safe dynamic dispatch wrapper for
//! TranslationProvider.
//!
//! 1. Define an object-safe `TranslationProviderDyn` trait with boxed futures
//! 2. Blanket-impl `TranslationProviderDyn` for all `T: TranslationProvider`
//! 3. `BoxTranslationProvider` wraps `Box<dyn TranslationProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use lingua_types::{
    HealthSnapshot, ProviderCapabilities, ProviderRequest, ProviderResult, TranslationContext,
};

use super::TranslationProvider;

/// Object-safe version of [`TranslationProvider`] with boxed futures.
///
/// A blanket implementation is provided for all types implementing
/// `TranslationProvider`.
pub trait TranslationProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities;

    fn translate_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
        context: &'a TranslationContext,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ProviderResult> + Send + 'a>>;

    fn health_check_boxed(
        &self,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = HealthSnapshot> + Send + '_>>;
}

impl<T: TranslationProvider> TranslationProviderDyn for T {
    fn name(&self) -> &str {
        TranslationProvider::name(self)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        TranslationProvider::capabilities(self)
    }

    fn translate_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
        context: &'a TranslationContext,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ProviderResult> + Send + 'a>> {
        Box::pin(self.translate(request, context, cancel))
    }

    fn health_check_boxed(
        &self,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = HealthSnapshot> + Send + '_>> {
        Box::pin(self.health_check(cancel))
    }
}

/// Type-erased translation provider for runtime selection by name.
///
/// `TranslationProvider` uses RPITIT, so it cannot be a trait object directly.
/// `BoxTranslationProvider` exposes equivalent methods that delegate to the
/// inner `TranslationProviderDyn` trait object.
pub struct BoxTranslationProvider {
    inner: Box<dyn TranslationProviderDyn + Send + Sync>,
}

impl BoxTranslationProvider {
    /// Wrap a concrete `TranslationProvider` in a type-erased box.
    pub fn new<T: TranslationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        self.inner.capabilities()
    }

    pub fn supports_streaming(&self) -> bool {
        self.capabilities().streaming
    }

    pub fn supports_glossary_hints(&self) -> bool {
        self.capabilities().glossary_hints
    }

    pub async fn translate(
        &self,
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: CancellationToken,
    ) -> ProviderResult {
        self.inner.translate_boxed(request, context, cancel).await
    }

    pub async fn health_check(&self, cancel: CancellationToken) -> HealthSnapshot {
        self.inner.health_check_boxed(cancel).await
    }
}

impl std::fmt::Debug for BoxTranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTranslationProvider")
            .field("name", &self.name())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

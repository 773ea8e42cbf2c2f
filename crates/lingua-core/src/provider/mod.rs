//! TranslationProvider trait definition.
//!
//! This is the capability contract every backend adapter implements. Uses
//! RPITIT for the async operations; [`BoxTranslationProvider`] erases the
//! concrete type so adapters can live side by side in the registry.

pub mod box_provider;
pub mod capability;
pub mod registry;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use lingua_types::{
    HealthSnapshot, ProviderCapabilities, ProviderRequest, ProviderResult, TranslationContext,
};

pub use box_provider::BoxTranslationProvider;
pub use registry::ProviderRegistry;

/// Trait for translation backends (cloud MT vendors, LLM adapters, local models).
///
/// Adapters are polymorphic over this capability set only; no shared base
/// behavior is assumed. Concrete HTTP/SDK clients live outside this crate.
pub trait TranslationProvider: Send + Sync {
    /// Stable identifier. Key of the fallback chain and of circuit/health state.
    fn name(&self) -> &str;

    fn supports_streaming(&self) -> bool;

    fn supports_glossary_hints(&self) -> bool;

    /// Capability flags as one value, for the candidate filter.
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: self.supports_streaming(),
            glossary_hints: self.supports_glossary_hints(),
        }
    }

    /// Translate a request.
    ///
    /// Implementations should stop work promptly once `cancel` fires; the
    /// returned future may also be dropped at any await point.
    fn translate(
        &self,
        request: &ProviderRequest,
        context: &TranslationContext,
        cancel: CancellationToken,
    ) -> impl Future<Output = ProviderResult> + Send;

    /// Out-of-band liveness probe. Not used on the fallback path.
    fn health_check(&self, cancel: CancellationToken)
    -> impl Future<Output = HealthSnapshot> + Send;
}

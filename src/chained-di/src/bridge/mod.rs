//! Plugs the container into the host abstraction.
//!
//! [`populate`] translates [`ServiceDescriptor`]s into native registrations
//! and, given a fallback [`ServiceProvider`], installs a
//! [`ChainedMissingExportStrategyProvider`] forwarding every request the
//! container can't resolve to that provider.

mod adapter;
mod chained;
mod fallback_scope;

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::registry::{Configurer, TypedConfigurer};
use crate::host::{ServiceDescriptor, ServiceProvider};
use crate::lifestyle::Lifestyle;
use crate::module::Module;

pub use adapter::{ContainerServiceScope, ScopeServiceProvider, ScopeServiceScopeFactory};
pub use chained::{ChainedMissingExportStrategyProvider, FallbackExportStrategy, MissingExportStrategy};
pub use fallback_scope::FallbackScope;

use adapter::{ServiceProviderStrategy, ServiceScopeFactoryStrategy};

/// Registers `descriptors` on `configurer` in order, together with the host
/// services every scope exposes: `dyn ServiceProvider` and
/// `dyn ServiceScopeFactory`, both bound to the requesting scope.
///
/// If `fallback` is given, requests the container can't resolve are
/// forwarded to it.
pub fn populate<'a, C, D>(configurer: &mut C, descriptors: D, fallback: Option<Arc<dyn ServiceProvider>>)
where
    C: Configurer + ?Sized,
    D: IntoIterator<Item = &'a ServiceDescriptor>,
{
    if let Some(fallback) = fallback {
        let provider = ChainedMissingExportStrategyProvider::new(fallback);
        configurer.add_missing_export_provider(Arc::new(provider));
    }

    configurer.register(ServiceProviderStrategy, Lifestyle::Transient);
    configurer.register(ServiceScopeFactoryStrategy, Lifestyle::Transient);

    let mut count = 0usize;
    for descriptor in descriptors {
        configurer
            .as_private()
            .dyn_register(*descriptor.service(), descriptor.to_export());
        count += 1;
    }
    tracing::debug!(count, "populated service descriptors");
}

/// A [`Module`] applying [`populate`].
pub struct Populate {
    descriptors: Vec<ServiceDescriptor>,
    fallback: Option<Arc<dyn ServiceProvider>>,
}

impl Populate {
    pub fn new(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
        fallback: Option<Arc<dyn ServiceProvider>>,
    ) -> Self {
        Self {
            descriptors: descriptors.into_iter().collect(),
            fallback,
        }
    }
}

impl Debug for Populate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Populate")
            .field("descriptors", &self.descriptors)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Module for Populate {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        populate(configurer, &self.descriptors, self.fallback.clone());
        Ok(())
    }
}

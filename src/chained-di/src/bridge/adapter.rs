use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::dispose::{Disposable, DisposeError};
use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::container::{InjectionScope, Instance};
use crate::host::{ServiceProvider, ServiceScope, ServiceScopeFactory};
use crate::key::ServiceKey;
use crate::strategy::{ActivationContext, TypedStrategy};

/// The host-facing provider of one injection scope.
#[derive(Debug, Clone)]
pub struct ScopeServiceProvider {
    scope: InjectionScope,
}

impl ScopeServiceProvider {
    pub fn new(scope: InjectionScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &InjectionScope {
        &self.scope
    }
}

impl ServiceProvider for ScopeServiceProvider {
    fn get_service(&self, key: &ServiceKey) -> Result<Option<Instance>, InjectorError> {
        match self.scope.dyn_locate(key) {
            Ok(instance) => Ok(Some(instance)),
            Err(InjectorError::NotFound { key: missing }) if missing == *key => Ok(None),
            Err(err) if !self.scope.options().throws_exceptions() => {
                tracing::debug!(%key, error = %err, "reporting a failed resolution as an absent service");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Creates child scopes of one injection scope.
#[derive(Debug, Clone)]
pub struct ScopeServiceScopeFactory {
    scope: InjectionScope,
}

impl ScopeServiceScopeFactory {
    pub fn new(scope: InjectionScope) -> Self {
        Self { scope }
    }
}

impl ServiceScopeFactory for ScopeServiceScopeFactory {
    fn create_scope(&self) -> Result<Box<dyn ServiceScope>, InjectorError> {
        let child = self.scope.create_child_scope()?;
        Ok(Box::new(ContainerServiceScope::new(child)?))
    }
}

/// A child injection scope seen as a host [`ServiceScope`]. Disposing it, or
/// dropping it, disposes the child scope.
pub struct ContainerServiceScope {
    scope: InjectionScope,
    provider: Arc<dyn ServiceProvider>,
}

impl ContainerServiceScope {
    /// Wraps `scope`, resolving its `dyn ServiceProvider` once. A scope
    /// without a registered provider is wrapped in a [`ScopeServiceProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if the registered provider can't be resolved.
    pub fn new(scope: InjectionScope) -> Result<Self, InjectorError> {
        let provider = match scope.try_get::<dyn ServiceProvider>()? {
            Some(provider) => provider,
            None => Arc::new(ScopeServiceProvider::new(scope.clone())),
        };
        Ok(Self { scope, provider })
    }

    pub fn scope(&self) -> &InjectionScope {
        &self.scope
    }
}

impl Debug for ContainerServiceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("ContainerServiceScope")
            .field(&self.scope)
            .finish()
    }
}

impl ServiceScope for ContainerServiceScope {
    fn service_provider(&self) -> Arc<dyn ServiceProvider> {
        Arc::clone(&self.provider)
    }
}

impl Disposable for ContainerServiceScope {
    fn dispose(&self) -> Result<(), DisposeError> {
        self.scope.dispose()
    }
}

impl Drop for ContainerServiceScope {
    fn drop(&mut self) {
        if let Err(err) = self.scope.dispose() {
            tracing::warn!(scope = %self.scope.id(), error = %err, "could not dispose a dropped service scope");
        }
    }
}

/// Exposes the requesting scope as `dyn ServiceProvider`.
#[derive(Debug)]
pub(super) struct ServiceProviderStrategy;

impl TypedStrategy for ServiceProviderStrategy {
    type Service = dyn ServiceProvider;

    fn activate(
        &self,
        context: &ActivationContext<'_>,
    ) -> Result<Arc<dyn ServiceProvider>, InjectorError> {
        let scope = context.requesting_scope().clone();
        Ok(Arc::new(ScopeServiceProvider::new(scope)))
    }
}

/// Exposes child scope creation of the requesting scope as
/// `dyn ServiceScopeFactory`.
#[derive(Debug)]
pub(super) struct ServiceScopeFactoryStrategy;

impl TypedStrategy for ServiceScopeFactoryStrategy {
    type Service = dyn ServiceScopeFactory;

    fn activate(
        &self,
        context: &ActivationContext<'_>,
    ) -> Result<Arc<dyn ServiceScopeFactory>, InjectorError> {
        let scope = context.requesting_scope().clone();
        Ok(Arc::new(ScopeServiceScopeFactory::new(scope)))
    }
}

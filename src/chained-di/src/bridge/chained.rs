use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::bridge::fallback_scope::FallbackScope;
use crate::container::dispose::Disposable;
use crate::container::injector::{InjectorError, TypedInjector};
use crate::container::{InjectionScope, Instance};
use crate::host::{ServiceProvider, ServiceScopeFactory, TypedServiceProvider};
use crate::key::{self, ServiceKey};
use crate::strategy::missing::{InjectionContext, MissingExportStrategyProvider};
use crate::strategy::{ActivationContext, Export, ExportStrategy, TypedStrategy};

/// Forwards requests the container can't resolve to a fallback
/// [`ServiceProvider`].
///
/// Every injection scope gets a [`FallbackScope`] on first use, so that scoped
/// services of the fallback provider follow the scopes of the container.
pub struct ChainedMissingExportStrategyProvider {
    fallback: Arc<dyn ServiceProvider>,
}

impl ChainedMissingExportStrategyProvider {
    pub fn new(fallback: Arc<dyn ServiceProvider>) -> Self {
        Self { fallback }
    }
}

impl Debug for ChainedMissingExportStrategyProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ChainedMissingExportStrategyProvider")
            .finish_non_exhaustive()
    }
}

impl MissingExportStrategyProvider for ChainedMissingExportStrategyProvider {
    fn provide_exports(
        &self,
        context: &InjectionContext<'_>,
        key: &ServiceKey,
    ) -> Result<Vec<Export>, InjectorError> {
        if *key == key::of::<FallbackScope>() {
            let strategy = FallbackExportStrategy::new(Arc::clone(&self.fallback));
            return Ok(vec![Export::per_scope(strategy)]);
        }

        if is_registered_in_chain(context.requesting_scope(), key) {
            tracing::debug!(%key, "sequence has primary registrations, not forwarding it");
            return Ok(Vec::new());
        }

        match self.fallback.get_service(key)? {
            Some(instance) if !instance.is_empty_sequence() => {
                tracing::debug!(%key, "deferring unresolved export to the fallback provider");
                Ok(vec![Export::transient(MissingExportStrategy::new(*key))])
            }
            _ => {
                tracing::debug!(%key, "fallback provider has nothing to contribute");
                Ok(Vec::new())
            }
        }
    }
}

/// Whether the elements of a sequence request are registered in `scope` or
/// any of its ancestors. Single requests are never considered registered
/// here, since the container only asks for them when it has none.
fn is_registered_in_chain(scope: &InjectionScope, key: &ServiceKey) -> bool {
    if !key.is_sequence() {
        return false;
    }

    let element = key.element();
    let mut current = Some(scope.clone());
    while let Some(scope) = current {
        if scope.get_strategy(&element).is_some() {
            return true;
        }
        current = scope.parent();
    }
    false
}

/// Resolves one key from the [`FallbackScope`] of the requesting scope.
#[derive(Debug)]
pub struct MissingExportStrategy {
    key: ServiceKey,
}

impl MissingExportStrategy {
    pub fn new(key: ServiceKey) -> Self {
        Self { key }
    }
}

impl ExportStrategy for MissingExportStrategy {
    fn dyn_activate(&self, context: &ActivationContext<'_>) -> Result<Instance, InjectorError> {
        let fallback = context.requesting_scope().get::<FallbackScope>()?;
        fallback
            .provider()
            .get_service(&self.key)?
            .ok_or_else(|| InjectorError::not_found(self.key))
    }
}

/// Creates the [`FallbackScope`] of the requesting scope.
///
/// Creation never fails. When the parent's fallback provider can't create a
/// child scope, the root fallback provider is used instead.
pub struct FallbackExportStrategy {
    root: Arc<dyn ServiceProvider>,
}

impl FallbackExportStrategy {
    pub fn new(root: Arc<dyn ServiceProvider>) -> Self {
        Self { root }
    }

    fn create_fallback_scope(&self, scope: &InjectionScope) -> FallbackScope {
        let Some(parent) = scope.parent() else {
            return FallbackScope::shared(Arc::clone(&self.root));
        };

        match Self::create_child_of(&parent) {
            Ok(Some(fallback)) => fallback,
            Ok(None) => FallbackScope::shared(Arc::clone(&self.root)),
            Err(err) => {
                tracing::warn!(
                    scope = %scope.id(),
                    error = %err,
                    "could not create a fallback child scope, using the root fallback provider",
                );
                FallbackScope::shared(Arc::clone(&self.root))
            }
        }
    }

    fn create_child_of(parent: &InjectionScope) -> Result<Option<FallbackScope>, InjectorError> {
        let Some(parent_fallback) = parent.try_get::<FallbackScope>()? else {
            return Ok(None);
        };
        let Some(factory) = parent_fallback.provider().service::<dyn ServiceScopeFactory>()? else {
            return Ok(None);
        };
        let child = factory.create_scope()?;
        Ok(Some(FallbackScope::owned(child)))
    }
}

impl Debug for FallbackExportStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FallbackExportStrategy")
            .finish_non_exhaustive()
    }
}

impl TypedStrategy for FallbackExportStrategy {
    type Service = FallbackScope;

    fn activate(&self, context: &ActivationContext<'_>) -> Result<Arc<FallbackScope>, InjectorError> {
        let scope = context.requesting_scope();
        let fallback = Arc::new(self.create_fallback_scope(scope));
        tracing::trace!(scope = %scope.id(), owns_scope = fallback.owns_scope(), "created fallback scope");

        let disposable: Arc<dyn Disposable> = fallback.clone();
        context.track_disposable(disposable)?;
        Ok(fallback)
    }
}

pub mod component;
pub mod factory;
pub mod instance;
pub mod missing;

use std::fmt::Debug;
use std::sync::Arc;

use crate::container::dispose::Disposable;
use crate::container::injector::{
    CallContext, ContextForwardingInjectorProxy, Injector, InjectorError,
};
use crate::container::{InjectionScope, Instance};
use crate::key::ServiceKey;
use crate::lifestyle::Lifestyle;

/// A recipe that activates the object exported for a key.
///
/// An [`ExportStrategy`] is responsible for producing an object on each
/// activation and for retrieving its dependencies through the
/// [`ActivationContext`]. Whether the object is reused afterwards is not its
/// business: that is decided by the [`Lifestyle`] of the [`Export`] it is
/// wrapped in, and enforced by the scope activating it.
///
/// Usually, you don't need to implement [`ExportStrategy`] manually, since
/// this is automatically done by [`TypedStrategy`]'s blanket implementation.
pub trait ExportStrategy: Debug + Send + Sync + 'static {
    /// Activates a new type-erased object.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be located or the object
    /// construction fails.
    fn dyn_activate(&self, context: &ActivationContext<'_>) -> Result<Instance, InjectorError>;
}

/// A static variant of the [`ExportStrategy`] trait which activates one
/// `Arc<Self::Service>`.
pub trait TypedStrategy: Debug + Send + Sync + 'static {
    /// The service type the activated object is exposed as.
    type Service: Send + Sync + ?Sized + 'static;

    /// Activates a new object.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be located or the object
    /// construction fails.
    fn activate(&self, context: &ActivationContext<'_>)
        -> Result<Arc<Self::Service>, InjectorError>;
}

impl<T: TypedStrategy> ExportStrategy for T {
    fn dyn_activate(&self, context: &ActivationContext<'_>) -> Result<Instance, InjectorError> {
        self.activate(context).map(Instance::single)
    }
}

/// An [`ExportStrategy`] together with the [`Lifestyle`] of the objects it
/// activates.
#[derive(Debug)]
pub struct Export {
    strategy: Box<dyn ExportStrategy>,
    lifestyle: Lifestyle,
}

impl Export {
    pub fn new(strategy: Box<dyn ExportStrategy>, lifestyle: Lifestyle) -> Self {
        Self {
            strategy,
            lifestyle,
        }
    }

    pub fn transient<E: ExportStrategy>(strategy: E) -> Self {
        Self::new(Box::new(strategy), Lifestyle::Transient)
    }

    pub fn per_scope<E: ExportStrategy>(strategy: E) -> Self {
        Self::new(Box::new(strategy), Lifestyle::SingletonPerScope)
    }

    pub fn singleton<E: ExportStrategy>(strategy: E) -> Self {
        Self::new(Box::new(strategy), Lifestyle::Singleton)
    }

    pub fn strategy(&self) -> &dyn ExportStrategy {
        self.strategy.as_ref()
    }

    pub fn lifestyle(&self) -> Lifestyle {
        self.lifestyle
    }
}

/// Everything a strategy may use while activating an object.
pub struct ActivationContext<'a> {
    scope: &'a InjectionScope,
    call: &'a CallContext<'a>,
}

impl<'a> ActivationContext<'a> {
    pub(crate) fn new(scope: &'a InjectionScope, call: &'a CallContext<'a>) -> Self {
        Self { scope, call }
    }

    /// The scope activating the object. For shared objects this is the scope
    /// that will own and cache the object.
    pub fn requesting_scope(&self) -> &InjectionScope {
        self.scope
    }

    pub fn key(&self) -> &ServiceKey {
        self.call.key()
    }

    pub fn call_context(&self) -> &CallContext<'a> {
        self.call
    }

    /// Returns an injector resolving dependencies of the object being
    /// activated from the requesting scope.
    pub fn injector(&self) -> impl Injector + '_ {
        ContextForwardingInjectorProxy::new(self.scope, self.call)
    }

    /// Hands `disposable` over to the requesting scope, which disposes it when
    /// the scope itself is disposed.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::ScopeDisposed`] if the requesting scope is
    /// already disposed. `disposable` is disposed immediately in this case.
    pub fn track_disposable(&self, disposable: Arc<dyn Disposable>) -> Result<(), InjectorError> {
        self.scope.track_disposable(disposable)
    }
}

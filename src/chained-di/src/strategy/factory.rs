use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError};
use crate::strategy::{ActivationContext, TypedStrategy};

type Factory<S> = dyn Fn(&dyn Injector) -> Result<Arc<S>, InjectorError> + Send + Sync;

/// Activates objects by calling a closure with an injector bound to the
/// requesting scope.
pub struct FactoryStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    factory: Arc<Factory<S>>,
}

impl<S> FactoryStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&dyn Injector) -> Result<Arc<S>, InjectorError> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }
}

impl<S> Clone for FactoryStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<S> Debug for FactoryStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FactoryStrategy")
            .field("service", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

impl<S> TypedStrategy for FactoryStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    type Service = S;

    fn activate(&self, context: &ActivationContext<'_>) -> Result<Arc<S>, InjectorError> {
        let injector = context.injector();
        (self.factory)(&injector)
    }
}

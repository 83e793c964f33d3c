use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError};
use crate::container::SharedManaged;
use crate::key::{self, ServiceKey};
use crate::lifestyle::Lifestyle;
use crate::strategy::component::{Component, ComponentStrategy};
use crate::strategy::factory::FactoryStrategy;
use crate::strategy::instance::ErasedInstanceStrategy;
use crate::strategy::{Export, ExportStrategy};

/// How long a service built from a [`ServiceDescriptor`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceLifetime {
    Transient,
    /// One instance per scope.
    Scoped,
    Singleton,
}

impl From<ServiceLifetime> for Lifestyle {
    fn from(lifetime: ServiceLifetime) -> Self {
        match lifetime {
            ServiceLifetime::Transient => Lifestyle::Transient,
            ServiceLifetime::Scoped => Lifestyle::SingletonPerScope,
            ServiceLifetime::Singleton => Lifestyle::Singleton,
        }
    }
}

/// What a [`ServiceDescriptor`] resolves its service with.
pub enum Implementation {
    /// An implementation type constructed by the container.
    Type {
        name: &'static str,
        strategy: fn() -> Box<dyn ExportStrategy>,
    },
    /// A pre-built instance, an `Arc<S>` of the service type `S`.
    Instance(Box<dyn SharedManaged>),
    /// A factory, wrapped in a function creating the strategy that calls it.
    Factory(Arc<dyn Fn() -> Box<dyn ExportStrategy> + Send + Sync>),
}

impl Clone for Implementation {
    fn clone(&self) -> Self {
        match self {
            Self::Type { name, strategy } => Self::Type {
                name: *name,
                strategy: *strategy,
            },
            Self::Instance(instance) => Self::Instance(instance.dyn_clone()),
            Self::Factory(factory) => Self::Factory(Arc::clone(factory)),
        }
    }
}

impl Debug for Implementation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Type { name, .. } => f.debug_tuple("Type").field(name).finish(),
            Self::Instance(instance) => f
                .debug_tuple("Instance")
                .field(&(**instance).type_name())
                .finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Describes one service registration: the service type, its implementation
/// and its lifetime.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    service: ServiceKey,
    implementation: Implementation,
    lifetime: ServiceLifetime,
}

impl ServiceDescriptor {
    /// Describes `S` implemented by the component `C`.
    pub fn component<S, C>(lifetime: ServiceLifetime) -> Self
    where
        S: Send + Sync + ?Sized + 'static,
        C: Component<Service = S>,
    {
        Self {
            service: key::of::<S>(),
            implementation: Implementation::Type {
                name: any::type_name::<C>(),
                strategy: ComponentStrategy::<C>::boxed,
            },
            lifetime,
        }
    }

    /// Describes `S` implemented by a pre-built instance, always a singleton.
    pub fn instance<S>(instance: Arc<S>) -> Self
    where
        S: Send + Sync + ?Sized + 'static,
    {
        Self {
            service: key::of::<S>(),
            implementation: Implementation::Instance(Box::new(instance)),
            lifetime: ServiceLifetime::Singleton,
        }
    }

    /// Describes `S` implemented by `factory`.
    pub fn factory<S, F>(lifetime: ServiceLifetime, factory: F) -> Self
    where
        S: Send + Sync + ?Sized + 'static,
        F: Fn(&dyn Injector) -> Result<Arc<S>, InjectorError> + Send + Sync + 'static,
    {
        let strategy = FactoryStrategy::new(factory);
        let boxed = move || -> Box<dyn ExportStrategy> { Box::new(strategy.clone()) };
        Self {
            service: key::of::<S>(),
            implementation: Implementation::Factory(Arc::new(boxed)),
            lifetime,
        }
    }

    pub fn service(&self) -> &ServiceKey {
        &self.service
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// Builds the native export this descriptor is registered as.
    pub(crate) fn to_export(&self) -> Export {
        let strategy: Box<dyn ExportStrategy> = match &self.implementation {
            Implementation::Type { strategy, .. } => strategy(),
            Implementation::Instance(instance) => {
                Box::new(ErasedInstanceStrategy::new(instance.dyn_clone()))
            }
            Implementation::Factory(factory) => factory(),
        };
        Export::new(strategy, self.lifetime.into())
    }
}

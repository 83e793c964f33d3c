mod context;
mod proxy;

use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::{Instance, ScopeId};
use crate::key::{self, ServiceKey};

pub use context::{CallContext, InjectionTrace};
pub(crate) use proxy::ContextForwardingInjectorProxy;

/// Something objects can be located from, typically an injection scope.
#[cfg_attr(test, mockall::automock)]
pub trait Injector: Send + Sync {
    /// Locates the object identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing can provide the object or its construction
    /// fails.
    fn dyn_locate(&self, key: &ServiceKey) -> Result<Instance, InjectorError>;

    /// Locates the object identified by `key` on behalf of the object being
    /// constructed in `context`.
    ///
    /// # Errors
    ///
    /// Same as [`Injector::dyn_locate`], plus cyclic dependencies detected
    /// through `context`.
    fn dyn_locate_dependency<'a>(
        &self,
        key: &ServiceKey,
        context: &'a CallContext<'a>,
    ) -> Result<Instance, InjectorError>;
}

/// Typed helpers over an [`Injector`].
pub trait TypedInjector: Injector {
    /// Locates one service of type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::NotFound`] if the service is not available,
    /// or any error occurred while constructing it.
    fn get<S>(&self) -> Result<Arc<S>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        let key = key::of::<S>();
        self.dyn_locate(&key)?
            .into_single()
            .map_err(|_| InjectorError::TypeMismatch { key })
    }

    /// Locates one service of type `S`, returning [`None`] if nothing can
    /// provide it.
    ///
    /// # Errors
    ///
    /// Returns any error except [`InjectorError::NotFound`] for `S` itself.
    fn try_get<S>(&self) -> Result<Option<Arc<S>>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        match self.get::<S>() {
            Ok(service) => Ok(Some(service)),
            Err(InjectorError::NotFound { key }) if key == key::of::<S>() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Locates every service of type `S`. The result may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if constructing any of the services fails.
    fn get_all<S>(&self) -> Result<Vec<Arc<S>>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        let key = key::all::<S>();
        self.dyn_locate(&key)?
            .into_sequence()
            .map_err(|_| InjectorError::TypeMismatch { key })
    }
}

impl<T> TypedInjector for T where T: Injector {}

impl TypedInjector for dyn Injector + '_ {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InjectorError {
    #[snafu(display("could not find the object identified by the given key {key}"))]
    #[non_exhaustive]
    NotFound { key: ServiceKey },
    #[snafu(display("could not construct the object {key} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { key: ServiceKey },
    #[snafu(display("could not construct the object {key}"))]
    #[non_exhaustive]
    ObjectConstruction {
        key: ServiceKey,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display("the object provided for {key} is not of the requested type"))]
    #[non_exhaustive]
    TypeMismatch { key: ServiceKey },
    #[snafu(display("could not use the scope {scope} which is already disposed"))]
    #[non_exhaustive]
    ScopeDisposed { scope: ScopeId },
}

impl InjectorError {
    pub fn not_found(key: ServiceKey) -> Self {
        Self::NotFound { key }
    }

    pub fn construction<E>(key: ServiceKey, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::ObjectConstruction {
            key,
            source: Arc::from(source.into()),
        }
    }
}

impl Clone for InjectorError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound { key } => Self::NotFound { key: *key },
            Self::CyclicDependency { key } => Self::CyclicDependency { key: *key },
            Self::ObjectConstruction { key, source } => Self::ObjectConstruction {
                key: *key,
                source: Arc::clone(source),
            },
            Self::TypeMismatch { key } => Self::TypeMismatch { key: *key },
            Self::ScopeDisposed { scope } => Self::ScopeDisposed { scope: *scope },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_injector_get_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_locate()
            .returning(|_| Ok(Instance::single(Arc::new(42i32))));

        assert_eq!(*injector.get::<i32>().unwrap(), 42);
        assert!(matches!(
            injector.get::<i64>(),
            Err(InjectorError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn typed_injector_try_get_succeeds_when_not_found() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_locate()
            .returning(|key| Err(InjectorError::not_found(*key)));

        assert!(injector.try_get::<i32>().unwrap().is_none());
    }

    #[test]
    fn typed_injector_try_get_fails_when_dependency_not_found() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_locate()
            .returning(|_| Err(InjectorError::not_found(key::of::<u8>())));

        assert!(matches!(
            injector.try_get::<i32>(),
            Err(InjectorError::NotFound { key }) if key == key::of::<u8>()
        ));
    }

    #[test]
    fn typed_injector_get_all_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_locate()
            .withf(|key| key.is_sequence())
            .returning(|_| Ok(Instance::sequence([Arc::new(1i32), Arc::new(2i32)])));

        let values = injector.get_all::<i32>().unwrap();
        assert_eq!(values.len(), 2);
    }
}

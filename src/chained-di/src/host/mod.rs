//! The host dependency injection abstraction: what applications program
//! against, independent of the container behind it.

mod collection;
mod descriptor;

use std::sync::Arc;

use crate::container::dispose::Disposable;
use crate::container::injector::InjectorError;
use crate::container::Instance;
use crate::key::{self, ServiceKey};

pub use collection::ServiceCollection;
pub use descriptor::{Implementation, ServiceDescriptor, ServiceLifetime};

/// Resolves services by key.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceProvider: Send + Sync + 'static {
    /// Resolves the service identified by `key`.
    ///
    /// Returns `Ok(None)` if the provider knows nothing about `key`. A
    /// [`Sequence`] request resolves to a possibly empty sequence instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is known but can't be constructed.
    ///
    /// [`Sequence`]: crate::key::RequestKind::Sequence
    fn get_service(&self, key: &ServiceKey) -> Result<Option<Instance>, InjectorError>;
}

/// Creates nested service scopes.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceScopeFactory: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error if the underlying scope can't have children anymore,
    /// e.g. because it is disposed.
    fn create_scope(&self) -> Result<Box<dyn ServiceScope>, InjectorError>;
}

/// A nested scope, released with [`Disposable::dispose`].
pub trait ServiceScope: Disposable {
    /// The provider resolving services within this scope.
    fn service_provider(&self) -> Arc<dyn ServiceProvider>;
}

/// Typed helpers over a [`ServiceProvider`].
pub trait TypedServiceProvider: ServiceProvider {
    /// # Errors
    ///
    /// Same as [`ServiceProvider::get_service`], plus
    /// [`InjectorError::TypeMismatch`] if the provider returned something
    /// else than an `Arc<S>`.
    fn service<S>(&self) -> Result<Option<Arc<S>>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        let key = key::of::<S>();
        match self.get_service(&key)? {
            Some(instance) => instance
                .into_single()
                .map(Some)
                .map_err(|_| InjectorError::TypeMismatch { key }),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns [`InjectorError::NotFound`] if the service is not available,
    /// or any error [`TypedServiceProvider::service`] returns.
    fn required_service<S>(&self) -> Result<Arc<S>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        self.service::<S>()?
            .ok_or_else(|| InjectorError::not_found(key::of::<S>()))
    }

    /// # Errors
    ///
    /// Same as [`TypedServiceProvider::service`].
    fn services<S>(&self) -> Result<Vec<Arc<S>>, InjectorError>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        let key = key::all::<S>();
        match self.get_service(&key)? {
            Some(instance) => instance
                .into_sequence()
                .map_err(|_| InjectorError::TypeMismatch { key }),
            None => Ok(Vec::new()),
        }
    }
}

impl<T: ServiceProvider + ?Sized> TypedServiceProvider for T {}

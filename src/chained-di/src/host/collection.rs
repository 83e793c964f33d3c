use std::slice::Iter;
use std::sync::Arc;

use crate::bridge::{Populate, ScopeServiceProvider};
use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::RegistryError;
use crate::container::{Container, ContainerOptions};
use crate::host::{ServiceDescriptor, ServiceLifetime, ServiceProvider};
use crate::strategy::component::Component;

/// An ordered list of [`ServiceDescriptor`]s.
///
/// # Examples
///
/// ```rust
/// # use std::sync::Arc;
/// # use chained_di::host::{ServiceCollection, TypedServiceProvider};
/// let mut services = ServiceCollection::new();
/// services.add_instance::<str>(Arc::from("primary"));
///
/// let provider = services.build_service_provider().unwrap();
/// assert_eq!(&*provider.required_service::<str>().unwrap(), "primary");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn add_singleton<S, C>(&mut self) -> &mut Self
    where
        S: Send + Sync + ?Sized + 'static,
        C: Component<Service = S>,
    {
        self.add(ServiceDescriptor::component::<S, C>(ServiceLifetime::Singleton))
    }

    pub fn add_scoped<S, C>(&mut self) -> &mut Self
    where
        S: Send + Sync + ?Sized + 'static,
        C: Component<Service = S>,
    {
        self.add(ServiceDescriptor::component::<S, C>(ServiceLifetime::Scoped))
    }

    pub fn add_transient<S, C>(&mut self) -> &mut Self
    where
        S: Send + Sync + ?Sized + 'static,
        C: Component<Service = S>,
    {
        self.add(ServiceDescriptor::component::<S, C>(ServiceLifetime::Transient))
    }

    pub fn add_instance<S>(&mut self, instance: Arc<S>) -> &mut Self
    where
        S: Send + Sync + ?Sized + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    pub fn add_factory<S, F>(&mut self, lifetime: ServiceLifetime, factory: F) -> &mut Self
    where
        S: Send + Sync + ?Sized + 'static,
        F: Fn(&dyn Injector) -> Result<Arc<S>, InjectorError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory(lifetime, factory))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Builds a container holding the described services and returns the
    /// provider of its root scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the container can't be configured.
    pub fn build_service_provider(&self) -> Result<ScopeServiceProvider, RegistryError> {
        self.build_service_provider_with(ContainerOptions::default(), None)
    }

    /// Same as [`ServiceCollection::build_service_provider`], forwarding
    /// everything the container can't resolve to `fallback`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container can't be configured.
    pub fn build_service_provider_with_fallback(
        &self,
        fallback: Arc<dyn ServiceProvider>,
    ) -> Result<ScopeServiceProvider, RegistryError> {
        self.build_service_provider_with(ContainerOptions::default(), Some(fallback))
    }

    /// # Errors
    ///
    /// Returns an error if the container can't be configured.
    pub fn build_service_provider_with(
        &self,
        options: ContainerOptions,
        fallback: Option<Arc<dyn ServiceProvider>>,
    ) -> Result<ScopeServiceProvider, RegistryError> {
        let module = Populate::new(self.descriptors.clone(), fallback);
        let container = Container::init_with(options, module)?;
        Ok(ScopeServiceProvider::new(container.into_root()))
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;

    type IntoIter = Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<T: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: T) {
        self.descriptors.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use crate::host::TypedServiceProvider;

    use super::*;

    #[test]
    fn service_collection_keeps_registration_order() {
        let mut services = ServiceCollection::new();
        assert!(services.is_empty());
        services
            .add_instance(Arc::new(1u32))
            .add_factory(ServiceLifetime::Scoped, |_| Ok(Arc::new(2u32)));
        services.extend([ServiceDescriptor::instance(Arc::new(3u32))]);

        assert_eq!(services.len(), 3);
        let lifetimes: Vec<_> = (&services).into_iter().map(|d| d.lifetime()).collect();
        assert_eq!(
            lifetimes,
            vec![
                ServiceLifetime::Singleton,
                ServiceLifetime::Scoped,
                ServiceLifetime::Singleton
            ]
        );

        let provider = services.build_service_provider().unwrap();
        assert_eq!(*provider.required_service::<u32>().unwrap(), 3);
        let all = provider.services::<u32>().unwrap();
        assert_eq!(all.iter().map(|v| **v).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}

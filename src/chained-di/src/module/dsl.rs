//! A fluent way of registering exports.
//!
//! ```rust
//! # use std::error::Error;
//! # use std::sync::Arc;
//! # use chained_di::prelude::*;
//! # use chained_di::module::dsl::bind;
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Polite {
//!     name: Arc<str>,
//! }
//!
//! impl Greeter for Polite {
//!     fn greet(&self) -> String {
//!         format!("Good morning, {}.", self.name)
//!     }
//! }
//!
//! struct Greetings;
//!
//! impl Module for Greetings {
//!     fn configure(
//!         &self,
//!         configurer: &mut dyn Configurer,
//!     ) -> Result<(), Box<dyn Error + Send + Sync>> {
//!         bind::<str>()
//!             .to_instance(Arc::from("Alice"))
//!             .set_on(configurer);
//!         bind::<dyn Greeter>()
//!             .to_factory(|injector| {
//!                 let name = injector.get::<str>()?;
//!                 let greeter: Arc<dyn Greeter> = Arc::new(Polite { name });
//!                 Ok(greeter)
//!             })
//!             .within(Lifestyle::SingletonPerScope)
//!             .set_on(configurer);
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::init(Greetings).unwrap();
//! let greeter = container.root().get::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Good morning, Alice.");
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::{Configurer, TypedConfigurer};
use crate::lifestyle::Lifestyle;
use crate::strategy::component::{Component, ComponentStrategy};
use crate::strategy::factory::FactoryStrategy;
use crate::strategy::instance::InstanceStrategy;
use crate::strategy::TypedStrategy;

/// Starts a registration exposing service `S`.
pub fn bind<S>() -> MetadataBinding<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    MetadataBinding {
        _marker: PhantomData,
    }
}

pub struct MetadataBinding<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    _marker: PhantomData<fn() -> Arc<S>>,
}

impl<S> MetadataBinding<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    pub fn to_component<C>(self) -> ExportBinding<ComponentStrategy<C>>
    where
        C: Component<Service = S>,
    {
        ExportBinding::new(ComponentStrategy::new())
    }

    /// Exposes a pre-built instance. Combine with [`Lifestyle::Singleton`]
    /// to make its sharing explicit; every lifestyle returns the same `Arc`.
    pub fn to_instance(self, instance: Arc<S>) -> ExportBinding<InstanceStrategy<S>> {
        ExportBinding::new(InstanceStrategy::new(instance))
    }

    pub fn to_factory<F>(self, factory: F) -> ExportBinding<FactoryStrategy<S>>
    where
        F: Fn(&dyn Injector) -> Result<Arc<S>, InjectorError> + Send + Sync + 'static,
    {
        ExportBinding::new(FactoryStrategy::new(factory))
    }

    pub fn to_strategy<E>(self, strategy: E) -> ExportBinding<E>
    where
        E: TypedStrategy<Service = S>,
    {
        ExportBinding::new(strategy)
    }
}

/// A registration ready to be set on a [`Configurer`]. Transient unless
/// configured otherwise.
pub struct ExportBinding<E>
where
    E: TypedStrategy,
{
    strategy: E,
    lifestyle: Lifestyle,
}

impl<E> ExportBinding<E>
where
    E: TypedStrategy,
{
    fn new(strategy: E) -> Self {
        Self {
            strategy,
            lifestyle: Lifestyle::Transient,
        }
    }

    pub fn within(self, lifestyle: Lifestyle) -> Self {
        Self { lifestyle, ..self }
    }

    pub fn as_transient(self) -> Self {
        self.within(Lifestyle::Transient)
    }

    pub fn set_on(self, configurer: &mut dyn Configurer) {
        configurer.register(self.strategy, self.lifestyle);
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::error::Error;

    use crate::container::injector::TypedInjector;
    use crate::container::registry::ConfigurerImpl;
    use crate::key;
    use crate::module::Module;

    use super::*;

    trait Shape: Send + Sync + 'static {
        fn corners(&self) -> u32;
    }

    struct Square;

    impl Shape for Square {
        fn corners(&self) -> u32 {
            4
        }
    }

    impl Component for Square {
        type Service = dyn Shape;

        type Error = Infallible;

        fn construct<I>(_injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
        where
            I: TypedInjector + ?Sized,
        {
            Ok(Ok(Square))
        }

        fn post_process(self) -> Arc<Self::Service> {
            Arc::new(self)
        }
    }

    struct DslCompilationTest;

    impl Module for DslCompilationTest {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            bind::<dyn Shape>()
                .to_component::<Square>()
                .within(Lifestyle::Singleton)
                .set_on(configurer);
            bind::<i64>()
                .to_factory(|_| Ok(Arc::new(42)))
                .set_on(configurer);
            bind::<i32>()
                .to_instance(Arc::new(42))
                .within(Lifestyle::SingletonPerScope)
                .as_transient()
                .set_on(configurer);
            bind::<str>()
                .to_strategy(InstanceStrategy::new(Arc::from("str")))
                .set_on(configurer);
            Ok(())
        }
    }

    #[test]
    fn dsl_registers_every_binding() {
        let mut configurer = ConfigurerImpl::new();
        DslCompilationTest.setup(&mut configurer);
        let registrations = configurer.finish().unwrap();

        let (_, shape) = registrations.exports.last(&key::of::<dyn Shape>()).unwrap();
        assert_eq!(shape.lifestyle(), Lifestyle::Singleton);
        let (_, number) = registrations.exports.last(&key::of::<i32>()).unwrap();
        assert_eq!(number.lifestyle(), Lifestyle::Transient);
        assert!(registrations.exports.last(&key::of::<i64>()).is_some());
        assert!(registrations.exports.last(&key::of::<str>()).is_some());
    }
}

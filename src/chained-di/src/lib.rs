#![allow(clippy::new_without_default)]

//! Plugs a scoped inversion-of-control container into a host dependency
//! injection abstraction, forwarding whatever the container can't resolve to
//! a fallback service provider.
//!
//! # Examples
//!
//! ```rust
//! # use std::sync::Arc;
//! # use chained_di::prelude::*;
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct Fixed;
//!
//! impl Clock for Fixed {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! // The provider the application already has.
//! let mut legacy = ServiceCollection::new();
//! legacy.add_instance::<dyn Clock>(Arc::new(Fixed));
//! let legacy = legacy.build_service_provider().unwrap();
//!
//! // A new container knowing nothing about clocks.
//! let mut services = ServiceCollection::new();
//! services.add_instance::<str>(Arc::from("app"));
//! let provider = services
//!     .build_service_provider_with_fallback(Arc::new(legacy))
//!     .unwrap();
//!
//! assert_eq!(provider.required_service::<dyn Clock>().unwrap().now(), 42);
//! assert_eq!(&*provider.required_service::<str>().unwrap(), "app");
//! ```

pub mod bridge;
pub mod container;
pub mod host;
pub mod key;
pub mod lifestyle;
pub mod module;
pub mod strategy;
mod util;

pub use chained_di_derive::component;

pub mod prelude {
    pub use crate::bridge::{populate, Populate};
    pub use crate::component;
    pub use crate::container::dispose::Disposable;
    pub use crate::container::injector::{Injector, InjectorError, TypedInjector};
    pub use crate::container::registry::{Configurer, RegistryError};
    pub use crate::container::{Container, ContainerOptions, InjectionScope};
    pub use crate::host::{
        ServiceCollection, ServiceLifetime, ServiceProvider, ServiceScope, ServiceScopeFactory,
        TypedServiceProvider,
    };
    pub use crate::key;
    pub use crate::lifestyle::Lifestyle;
    pub use crate::module::{Configuration, Module};
}

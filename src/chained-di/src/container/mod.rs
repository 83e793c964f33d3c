pub mod dispose;
pub mod injector;
pub mod registry;

mod core;
mod handle;
mod object_map;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::util::any::{AsAny, Downcast};

pub use handle::{Container, ContainerOptions, InjectionScope, ScopeId};

pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// A type-erased `Arc<S>`.
pub trait SharedManaged: Managed {
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;
}

impl<T> SharedManaged for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }
}

/// An object resolved for a [`ServiceKey`].
///
/// A [`RequestKind::Single`] request resolves to [`Instance::Single`], a
/// [`RequestKind::Sequence`] request to [`Instance::Sequence`]. Sequences are
/// always fully materialized, so inspecting one never consumes its elements.
///
/// [`ServiceKey`]: crate::key::ServiceKey
/// [`RequestKind::Single`]: crate::key::RequestKind::Single
/// [`RequestKind::Sequence`]: crate::key::RequestKind::Sequence
pub enum Instance {
    Single(Box<dyn SharedManaged>),
    Sequence(Vec<Box<dyn SharedManaged>>),
}

impl Instance {
    pub fn single<S>(service: Arc<S>) -> Self
    where
        S: Send + Sync + ?Sized + 'static,
    {
        Self::Single(Box::new(service))
    }

    pub fn sequence<S>(services: impl IntoIterator<Item = Arc<S>>) -> Self
    where
        S: Send + Sync + ?Sized + 'static,
    {
        Self::Sequence(
            services
                .into_iter()
                .map(|service| -> Box<dyn SharedManaged> { Box::new(service) })
                .collect(),
        )
    }

    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Self::Sequence(objects) if objects.is_empty())
    }

    /// Extracts the `Arc<S>` of a single instance, giving `self` back if the
    /// instance is a sequence or holds another type.
    pub fn into_single<S>(self) -> Result<Arc<S>, Self>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        match self {
            Self::Single(object) => match object.downcast::<Arc<S>>() {
                Ok(service) => Ok(*service),
                Err(object) => Err(Self::Single(object)),
            },
            sequence @ Self::Sequence(_) => Err(sequence),
        }
    }

    /// Extracts every `Arc<S>` of a sequence instance, giving `self` back if
    /// the instance is single or any element holds another type.
    pub fn into_sequence<S>(self) -> Result<Vec<Arc<S>>, Self>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        match self {
            Self::Sequence(objects) if objects.iter().all(|o| (**o).as_any().is::<Arc<S>>()) => {
                Ok(objects
                    .into_iter()
                    .map(|object| match object.downcast::<Arc<S>>() {
                        Ok(service) => *service,
                        Err(_) => unreachable!("every element should be `Arc<S>`"),
                    })
                    .collect())
            }
            other => Err(other),
        }
    }
}

impl Clone for Instance {
    fn clone(&self) -> Self {
        match self {
            Self::Single(object) => Self::Single(object.dyn_clone()),
            Self::Sequence(objects) => {
                Self::Sequence(objects.iter().map(|object| object.dyn_clone()).collect())
            }
        }
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Single(object) => f.debug_tuple("Single").field(&(**object).type_name()).finish(),
            Self::Sequence(objects) => f
                .debug_tuple("Sequence")
                .field(&objects.iter().map(|o| (**o).type_name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn instance_into_single_succeeds() {
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::single(Arc::clone(&greeter));

        let copy = instance.clone().into_single::<dyn Greeter>().unwrap();
        assert!(Arc::ptr_eq(&copy, &greeter));
        assert_eq!(copy.greet(), "hello");

        let instance = instance.into_single::<i32>().unwrap_err();
        assert!(matches!(instance, Instance::Single(_)));
    }

    #[test]
    fn instance_into_sequence_succeeds() {
        let instance = Instance::sequence([Arc::new(1i32), Arc::new(2i32)]);
        assert!(!instance.is_empty_sequence());

        let values = instance.clone().into_sequence::<i32>().unwrap();
        assert_eq!(values.iter().map(|v| **v).collect::<Vec<_>>(), vec![1, 2]);

        assert!(instance.into_sequence::<i64>().is_err());
        assert!(Instance::sequence::<i32>([]).is_empty_sequence());
        assert!(Instance::single(Arc::new(1i32)).into_sequence::<i32>().is_err());
    }
}

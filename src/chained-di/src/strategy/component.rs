use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::{InjectorError, TypedInjector};
use crate::strategy::{ActivationContext, ExportStrategy, TypedStrategy};

/// A type that has a dedicated constructor for dependency injection.
///
/// Usually, you don't need to implement the [`Component`] trait manually for
/// your components, because the [`component`] macro helps with this. In case
/// that you really want to write implementation in your own, take a look at
/// the following code snippet:
///
/// ```rust
/// # use std::sync::Arc;
/// # use std::convert::Infallible;
/// # use chained_di::container::injector::{TypedInjector, InjectorError};
/// # use chained_di::strategy::component::Component;
/// #
/// trait Greeter: Send + Sync + 'static {}
///
/// struct EnglishGreeter {
///     name: Arc<String>,
/// }
///
/// impl Greeter for EnglishGreeter {}
///
/// impl Component for EnglishGreeter {
///     type Service = dyn Greeter;
///
///     type Error = Infallible;
///
///     fn construct<I>(injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
///     where
///         I: TypedInjector + ?Sized
///     {
///         let name = injector.get::<String>()?;
///         Ok(Ok(Self { name }))
///     }
///
///     fn post_process(self) -> Arc<Self::Service> {
///         Arc::new(self)
///     }
/// }
/// ```
///
/// [`component`]: crate::component
pub trait Component: Send + Sync + Sized + 'static {
    /// The service the constructed object is exposed as, typically `Self` or
    /// some `dyn Trait`.
    type Service: Send + Sync + ?Sized + 'static;

    /// The error occurred in object construction after all dependencies are
    /// retrieved.
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// Retrieves the dependencies from the injector and creates the object.
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched.
    ///
    /// Returns an inner error [`Component::Error`] wrapped in the outer [`Ok`]
    /// if the object construction fails.
    fn construct<I>(injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
    where
        I: TypedInjector + ?Sized;

    /// Puts `self` into an [`Arc`] and coerces it to the service type.
    fn post_process(self) -> Arc<Self::Service>;
}

/// Activates a [`Component`] through its constructor.
pub struct ComponentStrategy<C>
where
    C: Component,
{
    _marker: PhantomData<fn() -> C>,
}

impl<C> ComponentStrategy<C>
where
    C: Component,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Type-erased constructor, usable as a plain `fn` pointer.
    pub fn boxed() -> Box<dyn ExportStrategy> {
        Box::new(Self::new())
    }
}

impl<C> Default for ComponentStrategy<C>
where
    C: Component,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for ComponentStrategy<C>
where
    C: Component,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentStrategy")
            .field("component", &std::any::type_name::<C>())
            .finish()
    }
}

impl<C> TypedStrategy for ComponentStrategy<C>
where
    C: Component,
{
    type Service = C::Service;

    fn activate(&self, context: &ActivationContext<'_>) -> Result<Arc<C::Service>, InjectorError> {
        let injector = context.injector();
        match C::construct(&injector) {
            Ok(Ok(obj)) => Ok(obj.post_process()),
            Ok(Err(err)) => Err(InjectorError::construction(*context.key(), err)),
            Err(err) => Err(err),
        }
    }
}

use crate::container::injector::{CallContext, Injector, InjectorError};
use crate::container::Instance;
use crate::key::ServiceKey;

/// Turns every plain request into a dependency request of the object being
/// constructed in `context`, so that cycles stay detectable.
pub struct ContextForwardingInjectorProxy<'a, I>
where
    I: Injector + ?Sized,
{
    inner: &'a I,
    context: &'a CallContext<'a>,
}

impl<'a, I> ContextForwardingInjectorProxy<'a, I>
where
    I: Injector + ?Sized,
{
    pub fn new(inner: &'a I, context: &'a CallContext<'a>) -> Self {
        Self { inner, context }
    }
}

impl<I> Injector for ContextForwardingInjectorProxy<'_, I>
where
    I: Injector + ?Sized,
{
    fn dyn_locate(&self, key: &ServiceKey) -> Result<Instance, InjectorError> {
        self.dyn_locate_dependency(key, self.context)
    }

    fn dyn_locate_dependency<'a>(
        &self,
        key: &ServiceKey,
        context: &'a CallContext<'a>,
    ) -> Result<Instance, InjectorError> {
        self.inner.dyn_locate_dependency(key, context)
    }
}

use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::InjectorError;
use crate::container::{Instance, SharedManaged};
use crate::strategy::{ActivationContext, ExportStrategy, TypedStrategy};

/// Exports a pre-built `Arc<S>`.
pub struct InstanceStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    instance: Arc<S>,
}

impl<S> InstanceStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    pub fn new(instance: Arc<S>) -> Self {
        Self { instance }
    }
}

impl<S> Debug for InstanceStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceStrategy")
            .field("service", &any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

impl<S> TypedStrategy for InstanceStrategy<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    type Service = S;

    fn activate(&self, _context: &ActivationContext<'_>) -> Result<Arc<S>, InjectorError> {
        Ok(Arc::clone(&self.instance))
    }
}

/// Exports a pre-built object whose service type is only known at runtime.
pub struct ErasedInstanceStrategy {
    instance: Box<dyn SharedManaged>,
}

impl ErasedInstanceStrategy {
    pub fn new(instance: Box<dyn SharedManaged>) -> Self {
        Self { instance }
    }
}

impl Debug for ErasedInstanceStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ErasedInstanceStrategy")
            .field("instance", &(*self.instance).type_name())
            .finish()
    }
}

impl ExportStrategy for ErasedInstanceStrategy {
    fn dyn_activate(&self, _context: &ActivationContext<'_>) -> Result<Instance, InjectorError> {
        Ok(Instance::Single(self.instance.dyn_clone()))
    }
}

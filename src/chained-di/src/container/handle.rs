use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::container::core::ScopeCore;
use crate::container::dispose::{Disposable, DisposeError};
use crate::container::injector::{CallContext, Injector, InjectorError};
use crate::container::registry::{ConfigurerImpl, Registrations, RegistryError};
use crate::container::Instance;
use crate::key::ServiceKey;
use crate::module::Module;
use crate::strategy::Export;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique identifier of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "scope#{}", self.0)
    }
}

/// Behavior switches of a container, shared by every scope of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    throw_exceptions: bool,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self {
            throw_exceptions: true,
        }
    }

    /// Whether the host-facing service provider reports resolution failures.
    /// When disabled, failures are logged and reported as absent services.
    pub fn throw_exceptions(self, throw_exceptions: bool) -> Self {
        Self { throw_exceptions }
    }

    pub fn throws_exceptions(&self) -> bool {
        self.throw_exceptions
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A container, i.e. the root of a scope tree.
///
/// # Examples
///
/// ```rust
/// # use std::error::Error;
/// # use std::sync::Arc;
/// # use chained_di::prelude::*;
/// # use chained_di::module::dsl::bind;
/// struct Settings;
///
/// impl Module for Settings {
///     fn configure(
///         &self,
///         configurer: &mut dyn Configurer,
///     ) -> Result<(), Box<dyn Error + Send + Sync>> {
///         bind::<u16>()
///             .to_instance(Arc::new(8080))
///             .within(Lifestyle::Singleton)
///             .set_on(configurer);
///         Ok(())
///     }
/// }
///
/// let container = Container::init(Settings).unwrap();
/// let request = container.root().create_child_scope().unwrap();
/// assert_eq!(*request.get::<u16>().unwrap(), 8080);
/// ```
#[derive(Clone)]
pub struct Container {
    root: InjectionScope,
}

impl Container {
    /// Creates a container configured by `module` with default options.
    ///
    /// # Errors
    ///
    /// Returns the errors reported by modules.
    pub fn init<M: Module>(module: M) -> Result<Self, RegistryError> {
        Self::init_with(ContainerOptions::default(), module)
    }

    /// Creates a container configured by `module`.
    ///
    /// # Errors
    ///
    /// Returns the errors reported by modules.
    pub fn init_with<M: Module>(options: ContainerOptions, module: M) -> Result<Self, RegistryError> {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let registrations = configurer.finish()?;
        Ok(Self::new_root(registrations, options))
    }

    /// Creates a container without any registration.
    pub fn empty() -> Self {
        Self::new_root(Registrations::default(), ContainerOptions::default())
    }

    fn new_root(registrations: Registrations, options: ContainerOptions) -> Self {
        let core = Arc::new(ScopeCore::new_root(registrations, options));
        Self {
            root: InjectionScope::from_core(core),
        }
    }

    pub fn root(&self) -> &InjectionScope {
        &self.root
    }

    pub fn into_root(self) -> InjectionScope {
        self.root
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("root", &self.root)
            .finish()
    }
}

/// A handle to one scope of a container. Cloning the handle never creates a
/// new scope.
///
/// Dropping the last handle (and the last child) of a scope disposes it.
#[derive(Clone)]
pub struct InjectionScope {
    core: Arc<ScopeCore>,
}

impl InjectionScope {
    pub(crate) fn from_core(core: Arc<ScopeCore>) -> Self {
        Self { core }
    }

    #[cfg(test)]
    pub(crate) fn core(&self) -> &ScopeCore {
        &self.core
    }

    pub fn id(&self) -> ScopeId {
        self.core.id()
    }

    pub fn options(&self) -> ContainerOptions {
        self.core.options()
    }

    pub fn parent(&self) -> Option<InjectionScope> {
        self.core.parent().map(|parent| Self::from_core(Arc::clone(parent)))
    }

    pub fn is_root(&self) -> bool {
        self.core.parent().is_none()
    }

    /// Creates a new scope whose parent is `self`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::ScopeDisposed`] if `self` is disposed.
    pub fn create_child_scope(&self) -> Result<InjectionScope, InjectorError> {
        self.core.new_child().map(Self::from_core)
    }

    /// Returns the last export registered in this scope for the service of
    /// `key`. Ancestors are not searched, nor are missing export providers.
    pub fn get_strategy(&self, key: &ServiceKey) -> Option<&Export> {
        self.core.get_strategy(key)
    }

    /// Hands `disposable` over to this scope, which disposes it when the scope
    /// itself is disposed.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::ScopeDisposed`] if `self` is disposed.
    /// `disposable` is disposed immediately in this case.
    pub fn track_disposable(&self, disposable: Arc<dyn Disposable>) -> Result<(), InjectorError> {
        self.core.track_disposable(disposable)
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Disposes this scope and every live descendant. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the first error occurred while releasing tracked disposables.
    /// Every disposable is released regardless.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        self.core.dispose()
    }

    /// Whether `self` and `other` are handles of the same scope.
    pub fn same_scope(&self, other: &InjectionScope) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Debug for InjectionScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InjectionScope")
            .field("id", &self.id())
            .field("parent", &self.core.parent().map(|parent| parent.id()))
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Injector for InjectionScope {
    fn dyn_locate(&self, key: &ServiceKey) -> Result<Instance, InjectorError> {
        let context = CallContext::new(key);
        self.core.locate(&context)
    }

    fn dyn_locate_dependency<'a>(
        &self,
        key: &ServiceKey,
        context: &'a CallContext<'a>,
    ) -> Result<Instance, InjectorError> {
        let context = context.append(key);
        self.core.locate(&context)
    }
}

use crate::container::injector::InjectorError;
use crate::container::InjectionScope;
use crate::key::ServiceKey;
use crate::strategy::Export;

/// The request a [`MissingExportStrategyProvider`] is consulted for.
pub struct InjectionContext<'a> {
    scope: &'a InjectionScope,
}

impl<'a> InjectionContext<'a> {
    pub(crate) fn new(scope: &'a InjectionScope) -> Self {
        Self { scope }
    }

    /// The scope the unresolved request was made against.
    pub fn requesting_scope(&self) -> &'a InjectionScope {
        self.scope
    }
}

/// An extension point consulted when a scope has no registered export for a
/// key.
///
/// Providers are consulted in installation order. The first non-empty list
/// of candidates wins, and its first element is activated. Returning an
/// empty list means "no contribution", in which case the scope eventually
/// reports [`InjectorError::NotFound`].
pub trait MissingExportStrategyProvider: Send + Sync + 'static {
    /// Returns candidate exports for `key`.
    ///
    /// # Errors
    ///
    /// Any error returned here is propagated to the caller of the lookup.
    fn provide_exports(
        &self,
        context: &InjectionContext<'_>,
        key: &ServiceKey,
    ) -> Result<Vec<Export>, InjectorError>;
}

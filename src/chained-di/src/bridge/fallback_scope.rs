use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::container::dispose::{Disposable, DisposeError};
use crate::host::{ServiceProvider, ServiceScope};

/// The fallback counterpart of one injection scope.
///
/// It resolves through either a child scope it created from the fallback
/// provider of the parent injection scope, which it owns and disposes, or
/// the root fallback provider, which it never disposes.
pub struct FallbackScope {
    provider: Arc<dyn ServiceProvider>,
    owned: Mutex<Option<Box<dyn ServiceScope>>>,
}

impl FallbackScope {
    pub(crate) fn shared(provider: Arc<dyn ServiceProvider>) -> Self {
        Self {
            provider,
            owned: Mutex::new(None),
        }
    }

    pub(crate) fn owned(scope: Box<dyn ServiceScope>) -> Self {
        Self {
            provider: scope.service_provider(),
            owned: Mutex::new(Some(scope)),
        }
    }

    pub fn provider(&self) -> &Arc<dyn ServiceProvider> {
        &self.provider
    }

    /// Whether this fallback scope still owns a child scope to dispose.
    pub fn owns_scope(&self) -> bool {
        self.owned.lock().is_some()
    }
}

impl Debug for FallbackScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FallbackScope")
            .field("owns_scope", &self.owns_scope())
            .finish_non_exhaustive()
    }
}

impl Disposable for FallbackScope {
    fn dispose(&self) -> Result<(), DisposeError> {
        let owned = self.owned.lock().take();
        match owned {
            Some(scope) => scope.dispose(),
            None => Ok(()),
        }
    }
}

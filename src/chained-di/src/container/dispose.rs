use std::error::Error;
use std::sync::Arc;

use parking_lot::Mutex;
use snafu::prelude::*;

/// A resource which should be released when the scope owning it ends.
///
/// Implementations are expected to release the underlying resource at most
/// once, so that calling [`Disposable::dispose`] again is a no-op.
#[cfg_attr(test, mockall::automock)]
pub trait Disposable: Send + Sync + 'static {
    /// Releases the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the underlying resource fails.
    fn dispose(&self) -> Result<(), DisposeError>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DisposeError {
    #[snafu(display("could not release {resource}"))]
    #[non_exhaustive]
    Release {
        resource: String,
        source: Box<dyn Error + Send + Sync>,
    },
}

impl DisposeError {
    pub fn release<E>(resource: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Release {
            resource: resource.into(),
            source: source.into(),
        }
    }
}

/// Disposables tracked by a scope, released in reverse order of tracking.
pub(crate) struct DisposalList {
    tracked: Mutex<Option<Vec<Arc<dyn Disposable>>>>,
}

impl DisposalList {
    pub fn new() -> Self {
        Self {
            tracked: Mutex::new(Some(Vec::new())),
        }
    }

    /// Tracks `disposable`. Returns it back if the list is already disposed.
    pub fn track(&self, disposable: Arc<dyn Disposable>) -> Result<(), Arc<dyn Disposable>> {
        match self.tracked.lock().as_mut() {
            Some(tracked) => {
                tracked.push(disposable);
                Ok(())
            }
            None => Err(disposable),
        }
    }

    /// Disposes every tracked object once. All objects are disposed even if
    /// some fail, and the first error is returned.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        let Some(tracked) = self.tracked.lock().take() else {
            return Ok(());
        };

        let mut first_error = None;
        for disposable in tracked.into_iter().rev() {
            if let Err(err) = disposable.dispose() {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    tracing::warn!(error = %err, "another disposal error after the first one");
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

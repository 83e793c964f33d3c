mod configurer;
mod strategy_map;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::key::{self, ServiceKey};
use crate::lifestyle::Lifestyle;
use crate::strategy::missing::MissingExportStrategyProvider;
use crate::strategy::{Export, TypedStrategy};

pub(crate) use configurer::{ConfigurerImpl, Registrations};
pub(crate) use strategy_map::StrategyMap;

/// Receives the registrations of a [`Module`].
///
/// [`Module`]: crate::module::Module
pub trait Configurer: Send + Sync + 'static {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    /// Installs an extension consulted for keys the scope can't resolve by
    /// itself. Providers are consulted in installation order.
    fn add_missing_export_provider(&mut self, provider: Arc<dyn MissingExportStrategyProvider>);

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

pub(crate) trait ConfigurerPrivate {
    /// Registers `export` for the service of `key`. Registrations of the same
    /// service never replace each other.
    fn dyn_register(&mut self, key: ServiceKey, export: Export);
}

pub trait TypedConfigurer: Configurer {
    fn register<E>(&mut self, strategy: E, lifestyle: Lifestyle)
    where
        E: TypedStrategy,
    {
        let export = Export::new(Box::new(strategy), lifestyle);
        self.as_private()
            .dyn_register(key::of::<E::Service>(), export);
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

impl RegistryError {
    pub(crate) fn from_errors(mut errors: Vec<RegistryError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Self::Aggregated { errors }
        }
    }
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_from_errors_aggregates_many() {
        let single = RegistryError::from_errors(vec![RegistryError::ModuleInner {
            module: "first",
            source: "boom".into(),
        }]);
        assert!(matches!(single, RegistryError::ModuleInner { module: "first", .. }));

        let many = RegistryError::from_errors(vec![
            RegistryError::ModuleInner {
                module: "first",
                source: "boom".into(),
            },
            RegistryError::ModuleInner {
                module: "second",
                source: "bang".into(),
            },
        ]);
        let message = many.to_string();
        assert!(message.contains("   1: module first"));
        assert!(message.contains("   2: module second"));
    }
}

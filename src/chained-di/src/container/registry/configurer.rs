use std::error::Error;
use std::sync::Arc;

use crate::container::registry::strategy_map::StrategyMap;
use crate::container::registry::{Configurer, ConfigurerPrivate, RegistryError};
use crate::key::ServiceKey;
use crate::strategy::missing::MissingExportStrategyProvider;
use crate::strategy::Export;

/// What a scope is configured with.
#[derive(Default)]
pub struct Registrations {
    pub exports: StrategyMap,
    pub missing: Vec<Arc<dyn MissingExportStrategyProvider>>,
}

pub struct ConfigurerImpl {
    registrations: Registrations,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            registrations: Registrations::default(),
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<Registrations, RegistryError> {
        if self.errors.is_empty() {
            Ok(self.registrations)
        } else {
            Err(RegistryError::from_errors(self.errors))
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn add_missing_export_provider(&mut self, provider: Arc<dyn MissingExportStrategyProvider>) {
        self.registrations.missing.push(provider);
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register(&mut self, key: ServiceKey, export: Export) {
        let index = self.registrations.exports.insert(&key, export);
        tracing::trace!(%key, index, "registered export");
    }
}

#[cfg(test)]
mod tests {
    use crate::container::injector::InjectorError;
    use crate::container::registry::TypedConfigurer;
    use crate::key;
    use crate::lifestyle::Lifestyle;
    use crate::strategy::instance::InstanceStrategy;
    use crate::strategy::missing::InjectionContext;

    use super::*;

    struct Nothing;

    impl MissingExportStrategyProvider for Nothing {
        fn provide_exports(
            &self,
            _context: &InjectionContext<'_>,
            _key: &ServiceKey,
        ) -> Result<Vec<Export>, InjectorError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn configurer_impl_register_succeeds() {
        let mut configurer = ConfigurerImpl::new();
        configurer.register(InstanceStrategy::new(Arc::new(42i32)), Lifestyle::Singleton);
        configurer.register(InstanceStrategy::new(Arc::new(7i32)), Lifestyle::Transient);
        configurer.add_missing_export_provider(Arc::new(Nothing));

        let registrations = configurer.finish().unwrap();
        assert_eq!(registrations.exports.all(&key::of::<i32>()).len(), 2);
        assert_eq!(registrations.missing.len(), 1);
    }

    #[test]
    fn configurer_impl_finish_fails_when_error_reported() {
        let mut configurer = ConfigurerImpl::new();
        configurer.register(InstanceStrategy::new(Arc::new(42i32)), Lifestyle::Singleton);
        configurer.report_module_error("test", "whatever".into());

        let err = configurer.finish().err().unwrap();
        assert!(matches!(err, RegistryError::ModuleInner { module: "test", .. }));
    }
}

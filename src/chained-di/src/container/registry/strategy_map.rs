use std::any::TypeId;
use std::collections::HashMap;

use crate::key::ServiceKey;
use crate::strategy::Export;

/// Exports registered in one scope, grouped by service type. Registrations
/// of the same service coexist in registration order.
#[derive(Debug, Default)]
pub struct StrategyMap {
    exports: HashMap<TypeId, Vec<Export>>,
}

impl StrategyMap {
    pub fn new() -> Self {
        Self {
            exports: HashMap::new(),
        }
    }

    /// Appends `export` for the service of `key`. Returns the index of the
    /// new registration among those of the same service.
    pub fn insert(&mut self, key: &ServiceKey, export: Export) -> usize {
        let slot = self.exports.entry(key.service_type()).or_default();
        slot.push(export);
        slot.len() - 1
    }

    /// Returns the last registration for the service of `key` with its index.
    pub fn last(&self, key: &ServiceKey) -> Option<(usize, &Export)> {
        self.all(key).iter().enumerate().next_back()
    }

    /// Returns every registration for the service of `key`.
    pub fn all(&self, key: &ServiceKey) -> &[Export] {
        self.exports
            .get(&key.service_type())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::key;
    use crate::lifestyle::Lifestyle;
    use crate::strategy::instance::InstanceStrategy;

    use super::*;

    #[test]
    fn strategy_map_insert_keeps_every_registration() {
        let mut map = StrategyMap::new();
        assert!(map.all(&key::all::<i32>()).is_empty());

        let first = map.insert(
            &key::of::<i32>(),
            Export::transient(InstanceStrategy::new(Arc::new(1i32))),
        );
        let second = map.insert(
            &key::of::<i32>(),
            Export::singleton(InstanceStrategy::new(Arc::new(2i32))),
        );
        assert_eq!((first, second), (0, 1));

        let (index, export) = map.last(&key::of::<i32>()).unwrap();
        assert_eq!(index, 1);
        assert_eq!(export.lifestyle(), Lifestyle::Singleton);
        assert_eq!(map.all(&key::all::<i32>()).len(), 2);
    }

    #[test]
    fn strategy_map_get_fails_when_service_not_registered() {
        let map = StrategyMap::new();
        assert!(map.last(&key::of::<i32>()).is_none());
        assert!(map.all(&key::all::<i32>()).is_empty());
    }
}

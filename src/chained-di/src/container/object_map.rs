use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::container::{Instance, ScopeId};
use crate::key::ServiceKey;

/// Identifies one export, i.e. the unit a shared object is cached for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportId {
    /// The `index`-th registration of `key` in the scope `scope`.
    Registered {
        scope: ScopeId,
        key: ServiceKey,
        index: usize,
    },
    /// An export contributed by a missing export provider for `key`.
    Contributed { key: ServiceKey },
}

impl ExportId {
    pub fn key(&self) -> &ServiceKey {
        match self {
            Self::Registered { key, .. } => key,
            Self::Contributed { key } => key,
        }
    }
}

impl Display for ExportId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Registered { scope, key, index } => write!(f, "{key}#{index}@{scope}"),
            Self::Contributed { key } => write!(f, "{key}@missing"),
        }
    }
}

/// Shared objects constructed and owned by one scope.
#[derive(Default)]
pub struct ObjectMap {
    objects: HashMap<ExportId, Instance>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: ExportId, object: Instance) -> Option<Instance> {
        self.objects.insert(id, object)
    }

    pub fn get(&self, id: &ExportId) -> Option<&Instance> {
        self.objects.get(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}
